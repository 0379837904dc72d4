use crate::support::{read_text_or_exit, render_json_or_exit};
use coalesce_kernel::extract_json_or_err;

pub fn run(file: String, json_output: bool) {
    let text = read_text_or_exit(&file, "reply text");
    let extraction = extract_json_or_err(&text).unwrap_or_else(|err| {
        eprintln!("error: {err}");
        std::process::exit(1);
    });
    tracing::debug!(strategy = extraction.strategy, "extracted json");

    if json_output {
        println!("{}", render_json_or_exit(&extraction, "extraction"));
    } else {
        println!("{}", render_json_or_exit(&extraction.value, "extracted value"));
    }
}
