/// mailforge CLI

use std::path::PathBuf;
use std::process;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use mailforge_compiler::{CompileOptions, Compiler};

#[derive(Parser, Debug)]
#[command(name = "mailforge")]
#[command(about = "Compiles annotated HTML email templates into typed Rust modules")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse HTML templates and generate Rust code
    Generate {
        /// Directory containing HTML email templates
        #[arg(short, long, value_name = "DIR", default_value = "./emails")]
        input: PathBuf,

        /// Directory to write generated Rust code
        #[arg(short, long, value_name = "DIR", default_value = "./src/emails")]
        output: PathBuf,

        /// Version string to embed in generated files
        #[arg(long, value_name = "VERSION", default_value = env!("CARGO_PKG_VERSION"))]
        tag: String,

        /// Print a line for every file written
        #[arg(short, long)]
        verbose: bool,

        /// Print the parsed IR as JSON and exit without generating
        #[arg(long)]
        dump_ir: bool,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("mailforge: {e:#}");
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            input,
            output,
            tag,
            verbose,
            dump_ir,
        } => {
            anyhow::ensure!(
                input.is_dir(),
                "input directory does not exist: {}",
                input.display()
            );

            let options = CompileOptions::new(&input)
                .output_dir(&output)
                .version(tag)
                .verbose(verbose);
            let compiler = Compiler::new(options);

            let templates = compiler.parse()?;

            if dump_ir {
                let json = serde_json::to_string_pretty(&templates)
                    .context("serializing parsed templates")?;
                println!("{json}");
                return Ok(());
            }

            anyhow::ensure!(
                !templates.is_empty(),
                "no .html templates found in input directory: {}",
                input.display()
            );

            compiler.generate(&templates)?;
            println!(
                "Generated {} email templates into {}",
                templates.len(),
                output.display()
            );
        }
    }

    Ok(())
}
