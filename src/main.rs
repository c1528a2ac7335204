use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use ll1_course_helper::{Error, Grammar, LL1Parser, Verdict};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Output {
    /// Productions (after left factoring)
    Prod,
    /// Nullable, FIRST and FOLLOW
    Nff,
    /// LL(1) parsing table
    Ll1,
    /// Step-by-step parse of --input
    Trace,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Plain,
    Latex,
    Json,
}

#[derive(Parser, Debug)]
#[command(version, about = "LL(1) predictive parsing helper", long_about = None)]
struct Args {
    /// What to print; may be repeated or comma-separated
    #[arg(short, long, value_enum, value_delimiter = ',', required = true)]
    output: Vec<Output>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
    format: OutputFormat,

    /// Tokens to parse, separated by whitespace (`$` is appended if missing)
    #[arg(short, long)]
    input: Option<String>,

    /// Treat every non-whitespace character of --input as one token
    #[arg(long)]
    chars: bool,

    /// Grammar file; read from stdin when omitted
    grammar: Option<PathBuf>,
}

fn tokenize(input: &str, chars: bool) -> Vec<String> {
    if chars {
        input
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(String::from)
            .collect()
    } else {
        input.split_whitespace().map(String::from).collect()
    }
}

fn main() -> Result<(), Error> {
    env_logger::init();

    let args = Args::parse();

    let text = match &args.grammar {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().lock().read_to_string(&mut buf)?;
            buf
        }
    };

    let grammar = Grammar::parse(&text)?;
    let parser = LL1Parser::new(&grammar)?;

    for output in &args.output {
        let text = match output {
            Output::Prod => {
                let t = parser.grammar().to_productions_output();
                match args.format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::Latex => t.to_latex(),
                    OutputFormat::Json => t.to_json(),
                }
            }
            Output::Nff => {
                let t = parser.to_first_follow_output();
                match args.format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::Latex => t.to_latex(),
                    OutputFormat::Json => t.to_json(),
                }
            }
            Output::Ll1 => {
                let t = parser.table().to_output();
                match args.format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::Latex => t.to_latex(),
                    OutputFormat::Json => t.to_json(),
                }
            }
            Output::Trace => {
                let input = args.input.as_deref().unwrap_or("");
                let result = parser.parse(tokenize(input, args.chars));
                match &result.verdict {
                    Verdict::Accepted => log::info!("input accepted"),
                    Verdict::Rejected(e) => {
                        log::info!("input rejected at token {}: {}", e.position(), e)
                    }
                }
                let t = result.to_output();
                match args.format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::Latex => t.to_latex(),
                    OutputFormat::Json => t.to_json(),
                }
            }
        };
        println!("{}", text);
    }

    Ok(())
}
