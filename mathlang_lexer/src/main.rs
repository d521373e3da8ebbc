use mathlang_lexer::config::runtime::RuntimeConfig;
use mathlang_lexer::file_processor::{FileProcessor, FileProcessorError};
use mathlang_lexer::lexical::{self, TokenizerError};
use mathlang_lexer::tokens::TokenStream;
use mathlang_lexer::utils::SourceMap;
use mathlang_lexer::{config, file_processor, logging};
use std::env;
use std::error::Error;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
enum Input {
    File(PathBuf),
    Expression(String),
}

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    input: Option<Input>,
    config: Option<PathBuf>,
    json: bool,
    spans: bool,
    help: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    let program_name = args.first().map(String::as_str).unwrap_or("mathlang_lexer");

    let options = match parse_options(&args[1.min(args.len())..]) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("Usage: {} <input.mlang> [--json] [--spans]", program_name);
            eprintln!("       {} --help", program_name);
            std::process::exit(2);
        }
    };

    if options.help {
        print_help(program_name);
        return Ok(());
    }

    let runtime = match &options.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };

    logging::config::init_runtime_preferences(runtime.logging.clone())?;
    logging::init_global_logging()?;
    file_processor::init_file_processor_logging()?;
    lexical::init_lexical_analysis_logging()?;

    let source = match options.input {
        Some(Input::File(ref path)) => {
            let processor = FileProcessor::from_preferences(&runtime.file_processor);
            match processor.process_file(path) {
                Ok(result) => result.source,
                Err(error) => {
                    print_file_error(&error);
                    std::process::exit(1);
                }
            }
        }
        Some(Input::Expression(ref expression)) => expression.clone(),
        None => {
            eprintln!("Error: no input given");
            std::process::exit(2);
        }
    };

    match lexical::tokenize_with_preferences(&source, runtime.lexical.clone()) {
        Ok(stream) => {
            print!("{}", render_tokens(&stream, options.json, options.spans)?);
            Ok(())
        }
        Err(error) => {
            eprint!("{}", render_tokenizer_error(&source, &error));
            std::process::exit(1);
        }
    }
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions {
        input: None,
        config: None,
        json: false,
        spans: false,
        help: false,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => options.help = true,
            "--json" => options.json = true,
            "--spans" => options.spans = true,
            "--expr" => {
                let expression = args.get(i + 1).ok_or("--expr requires a source string")?;
                set_input(&mut options, Input::Expression(expression.clone()))?;
                i += 1;
            }
            "--config" => {
                let path = args.get(i + 1).ok_or("--config requires a path")?;
                options.config = Some(PathBuf::from(path));
                i += 1;
            }
            other if other.starts_with("--") => {
                return Err(format!("Unknown option '{}'", other));
            }
            path => set_input(&mut options, Input::File(PathBuf::from(path)))?,
        }
        i += 1;
    }

    if options.input.is_none() && !options.help {
        return Err("expected an input file or --expr".to_string());
    }

    Ok(options)
}

fn set_input(options: &mut CliOptions, input: Input) -> Result<(), String> {
    if options.input.is_some() {
        return Err("only one input (file or --expr) may be given".to_string());
    }
    options.input = Some(input);
    Ok(())
}

fn print_help(program_name: &str) {
    println!("MathLang Lexer v{}", env!("CARGO_PKG_VERSION"));
    println!("Tokenizes MathLang source into names, numbers, strings and symbols");
    println!();
    println!("USAGE:");
    println!("    {} <input.mlang> [options]", program_name);
    println!("    {} --expr \"<source>\" [options]", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --expr <source>     Tokenize the given text instead of a file");
    println!("    --json              Print the token stream as a JSON array");
    println!("    --spans             Include line:column spans in the output");
    println!("    --config <file>     Load runtime preferences from a TOML file");
    println!();
    println!("BUILD CONFIGURATION:");
    println!("    {}", config::build_info::source_info());
    println!(
        "    Max file size: {} bytes, max tokens: {}",
        file_processor::get_max_file_size(),
        config::compile_time::lexical::MAX_TOKEN_COUNT
    );
    println!();
    println!("EXAMPLES:");
    println!("    {} area.mlang --spans", program_name);
    println!("    {} --expr 'x = \"hi\" + 3' --json", program_name);
}

/// One token per line, or a JSON array with `--json`
fn render_tokens(stream: &TokenStream, json: bool, spans: bool) -> Result<String, serde_json::Error> {
    if json {
        let entries: Vec<serde_json::Value> = stream
            .tokens()
            .iter()
            .map(|spanned| {
                let mut entry = serde_json::json!({
                    "kind": spanned.value.kind(),
                    "text": spanned.value.to_string(),
                    "token": &spanned.value,
                });
                if spans {
                    entry["span"] = serde_json::json!(spanned.span);
                }
                entry
            })
            .collect();
        return Ok(format!("{}\n", serde_json::to_string_pretty(&entries)?));
    }

    let mut output = String::new();
    for spanned in stream.tokens() {
        if spans {
            output.push_str(&format!(
                "{:<8} {:<10} {}\n",
                spanned.span.to_string(),
                spanned.value.kind(),
                spanned.value
            ));
        } else {
            output.push_str(&format!("{:<7} {}\n", spanned.value.kind(), spanned.value));
        }
    }
    Ok(output)
}

fn render_tokenizer_error(source: &str, error: &TokenizerError) -> String {
    let source_map = SourceMap::new(source.to_string());
    let mut output = source_map.format_error(&error.span(), &error.to_string());

    if let Some(cause) = error.source() {
        output.push_str(&format!("  caused by: {}\n", cause));
    }
    output.push_str(&format!("  [{}] {}\n", error.error_code(), error.category()));
    output
}

fn print_file_error(error: &FileProcessorError) {
    eprintln!("File processing failed:");
    eprintln!("  {}", error);
    eprintln!(
        "  [{}] {}",
        error.error_code(),
        logging::codes::get_action(error.error_code().as_str())
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use mathlang_lexer::config::runtime::LexicalPreferences;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn quiet() -> LexicalPreferences {
        LexicalPreferences {
            collect_metrics: false,
            log_each_token: false,
            include_position_in_errors: false,
        }
    }

    #[test]
    fn test_parse_file_input() {
        let options = parse_options(&args(&["calc.mlang", "--spans"])).unwrap();
        assert_eq!(options.input, Some(Input::File(PathBuf::from("calc.mlang"))));
        assert!(options.spans);
        assert!(!options.json);
    }

    #[test]
    fn test_parse_expression_input() {
        let options = parse_options(&args(&["--expr", "a + 1", "--json"])).unwrap();
        assert_eq!(options.input, Some(Input::Expression("a + 1".to_string())));
        assert!(options.json);
    }

    #[test]
    fn test_parse_errors() {
        assert_matches!(parse_options(&args(&[])), Err(_));
        assert_matches!(parse_options(&args(&["--expr"])), Err(_));
        assert_matches!(parse_options(&args(&["a.mlang", "b.mlang"])), Err(_));
        assert_matches!(parse_options(&args(&["a.mlang", "--bogus"])), Err(_));
        assert!(parse_options(&args(&["--help"])).unwrap().help);
    }

    #[test]
    fn test_render_plain_and_spans() {
        let stream = lexical::tokenize_with_preferences("x = \"a\\\"b\" + 2", quiet()).unwrap();

        let plain = render_tokens(&stream, false, false).unwrap();
        assert_eq!(
            plain,
            "Name    x\nSymbol  =\nString  \"a\\\"b\"\nSymbol  +\nNumber  2\n"
        );

        let spanned = render_tokens(&stream, false, true).unwrap();
        assert!(spanned.starts_with("1:1-2    Name       x\n"));
    }

    #[test]
    fn test_render_json() {
        let stream = lexical::tokenize_with_preferences("n 7", quiet()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&render_tokens(&stream, true, true).unwrap()).unwrap();

        assert_eq!(json[0]["kind"], "Name");
        assert_eq!(json[0]["token"]["Name"], "n");
        assert_eq!(json[1]["text"], "7");
        assert_eq!(json[1]["span"]["start"]["column"], 3);
    }

    #[test]
    fn test_render_tokenizer_error() {
        let source = "1 +\n_bad";
        let error = lexical::tokenize_with_preferences(source, quiet()).unwrap_err();
        let rendered = render_tokenizer_error(source, &error);

        assert!(rendered.contains("Error: Unexpected character '_' at 2:1"));
        assert!(rendered.contains("2 | _bad\n"));
        assert!(rendered.contains("[E020] Lexical"));
    }
}
