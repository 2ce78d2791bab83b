use clap::{Parser, Subcommand};
use colored::Colorize;
use bytere::{filter, Regex, FILTER_EXCLUDE, FILTER_WITH_INDEX};

#[derive(Parser)]
#[command(name = "bytere")]
#[command(about = "bytere - a small byte-oriented regex engine")]
#[command(version)]
struct Cli {
    /// Use ex-style grouping: \( \) group, bare parens are literal
    #[arg(long, global = true)]
    ex: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Test a pattern against input, showing captures
    Test {
        /// The regex pattern
        pattern: String,
        /// The input string to test
        input: String,
        /// Show capture groups
        #[arg(short, long)]
        verbose: bool,
    },
    /// Check whether a pattern matches (exit code reflects the answer)
    Match {
        /// The regex pattern
        pattern: String,
        /// The input string
        input: String,
    },
    /// Match and expand a substitution template (& and \1..\9)
    Sub {
        /// The regex pattern
        pattern: String,
        /// The input string
        input: String,
        /// The substitution template
        template: String,
    },
    /// Keep the arguments that match the pattern
    Filter {
        /// The regex pattern
        pattern: String,
        /// The strings to sift
        strings: Vec<String>,
        /// Keep non-matches instead
        #[arg(short = 'x', long)]
        exclude: bool,
        /// Show 1-based positions
        #[arg(short, long)]
        indexed: bool,
    },
    /// Dump the compiled program
    Dump {
        /// The regex pattern
        pattern: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let excompat = !cli.ex;

    match cli.command {
        Commands::Test {
            pattern,
            input,
            verbose,
        } => cmd_test(&pattern, &input, verbose, excompat),
        Commands::Match { pattern, input } => cmd_match(&pattern, &input, excompat),
        Commands::Sub {
            pattern,
            input,
            template,
        } => cmd_sub(&pattern, &input, &template, excompat),
        Commands::Filter {
            pattern,
            strings,
            exclude,
            indexed,
        } => cmd_filter(&pattern, &strings, exclude, indexed),
        Commands::Dump { pattern } => cmd_dump(&pattern, excompat),
    }
}

fn compile_or_exit(pattern: &str, excompat: bool) -> Regex {
    match Regex::compile(pattern.as_bytes(), excompat) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn cmd_test(pattern: &str, input: &str, verbose: bool, excompat: bool) {
    println!("  Pattern: {}", pattern.cyan());
    println!("  Input:   {}", input.yellow());
    println!();

    let mut re = compile_or_exit(pattern, excompat);
    if !re.exec(input.as_bytes()) {
        println!("{}", "no match".red());
        return;
    }

    let (start, end) = re.span(0).expect("whole-match span after success");
    println!("{}", "match".green().bold());
    println!("  Position: {start}..{end}");
    println!("  Match:    {}", lossy(re.group(input.as_bytes(), 0)).green());

    if verbose {
        for n in 1..bytere::NSUBEXP {
            if let Some((s, e)) = re.span(n) {
                println!(
                    "  Group {n}: {s}..{e} = {}",
                    lossy(re.group(input.as_bytes(), n)).green()
                );
            }
        }
    }
}

fn cmd_match(pattern: &str, input: &str, excompat: bool) {
    let mut re = compile_or_exit(pattern, excompat);
    if re.exec(input.as_bytes()) {
        println!("{}", "true".green());
    } else {
        println!("{}", "false".red());
        std::process::exit(1);
    }
}

fn cmd_sub(pattern: &str, input: &str, template: &str, excompat: bool) {
    let mut re = compile_or_exit(pattern, excompat);
    if !re.exec(input.as_bytes()) {
        println!("{}", "no match".red());
        std::process::exit(1);
    }
    let mut out = vec![0u8; input.len() + template.len() + 256];
    match re.substitute(input.as_bytes(), template.as_bytes(), &mut out) {
        Ok(end) => println!("{}", String::from_utf8_lossy(&out[..end])),
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn cmd_filter(pattern: &str, strings: &[String], exclude: bool, indexed: bool) {
    let mut flag = 0;
    if indexed {
        flag |= FILTER_WITH_INDEX;
    }
    if exclude {
        flag |= FILTER_EXCLUDE;
    }
    match filter(strings, pattern.as_bytes(), flag) {
        Ok(kept) => {
            for (i, s) in kept {
                match i {
                    Some(i) => println!("{i:>4} {s}"),
                    None => println!("{s}"),
                }
            }
        }
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn cmd_dump(pattern: &str, excompat: bool) {
    let re = compile_or_exit(pattern, excompat);
    print!("{}", re.dump());
}

fn lossy(bytes: Option<&[u8]>) -> String {
    String::from_utf8_lossy(bytes.unwrap_or_default()).into_owned()
}
