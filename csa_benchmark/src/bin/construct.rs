use std::{path::PathBuf, process::ExitCode, time::Instant};

use clap::Parser;
use csa::Variant;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Builds a compressed suffix array of the text file and stores it in the index file.
pub struct Conf {
    /// Structural variant: 0 - wavelet tree, 1 - encoded vector, any other - bit-compressed
    #[arg(allow_negative_numbers = true)]
    pub variant: i64,

    /// File with the text to index
    pub input: PathBuf,

    /// File to store the index in
    pub output: PathBuf,
}

fn main() -> ExitCode {
    let conf = Conf::parse();
    let variant = Variant::from_code(conf.variant);
    let text = match std::fs::read(&conf.input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Cannot read the text from {}: {e}", conf.input.display());
            return ExitCode::FAILURE;
        }
    };
    eprintln!("Building {variant} index of {} ({} bytes)...", conf.input.display(), text.len());
    let start_moment = Instant::now();
    let index = csa::build(variant, &text);
    eprintln!("Built in {:.2} s", start_moment.elapsed().as_secs_f64());
    eprintln!("Size = {:.6}", csa::size_in_mega_bytes(&*index));
    if let Err(e) = csa::store_to_file(&*index, &conf.output) {
        eprintln!("Cannot write the index to {}: {e}", conf.output.display());
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
