use pagecraft_render::{render_json, RenderError, RenderResult};
use std::env;
use std::fs;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: pagecraft-render [--css] <document.json>...");
        eprintln!();
        eprintln!("Renders each document's ROOT subtree and prints the HTML.");
        eprintln!("With --css, prints the collected stylesheet after each document.");
        process::exit(1);
    }

    let with_css = args[1..].iter().any(|a| a == "--css");
    let mut exit_code = 0;

    for file_path in args[1..].iter().filter(|a| *a != "--css") {
        match render_file(file_path) {
            Ok((html, css)) => {
                println!("{html}");
                if with_css && !css.is_empty() {
                    println!("<style>\n{css}\n</style>");
                }
            }
            Err(e) => {
                eprintln!("✗ {file_path}:");
                print_error(&e);
                exit_code = 1;
            }
        }
    }

    process::exit(exit_code);
}

fn render_file(path: &str) -> RenderResult<(String, String)> {
    let content = fs::read_to_string(path)?;
    let fragment = render_json(&content)?;
    let css = fragment.css();
    Ok((fragment.html, css))
}

fn print_error(error: &RenderError) {
    match error {
        RenderError::InvalidJson(err) => {
            eprintln!("  JSON error at line {}, column {}:", err.line(), err.column());
            eprintln!("    {err}");
        }
        RenderError::MissingRoot { root } => {
            eprintln!("  No '{root}' node found");
            eprintln!("    Documents render from their '{root}' node");
        }
        e => {
            eprintln!("  {e}");
        }
    }
}
