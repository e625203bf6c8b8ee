//! `ragchunk info`

use console::style;
use ragchunk_core::extraction::DocumentFormat;
use ragchunk_core::AppConfig;

use crate::output;

pub fn run(config: &AppConfig) {
    output::print_banner("Supported formats and settings");

    println!("\n{}", style("Supported Formats:").bold());
    let rows: Vec<Vec<String>> = DocumentFormat::ALL
        .iter()
        .map(|format| vec![format!(".{}", format.extension()), format.description().to_string()])
        .collect();
    println!("{}", output::format_table(&["Extension", "Description"], &rows, &[]));

    let chunking = &config.chunking;
    println!("\n{}", style("Current Configuration:").bold());
    println!("  Max tokens per chunk: {}", output::format_count(chunking.max_tokens));
    println!("  Overlap tokens:       {}", output::format_count(chunking.overlap_tokens));
    println!("  Tokenizer model:      {}", chunking.model);
    println!("  Token count cache:    {}", output::format_count(config.tokenizer.cache_capacity));
    println!("  Batch workers:        {}", config.batch.worker_count());

    println!("\n{}", style("Tokenizer Models:").bold());
    println!("  gpt-4, gpt-4o, gpt-3.5-turbo, ...  OpenAI BPE (tiktoken)");
    println!("  cl100k_base, o200k_base, ...       BPE encodings by name");
    println!("  hf:<path/to/tokenizer.json>        HuggingFace tokenizer");
    println!("  words                              one token per word");
    println!("  approx                             ~4 characters per token");
}
