use anyhow::{Context, Result};
use clap::{Arg, Command};

fn main() -> Result<()> {
    let matches = Command::new("msr")
        .version(env!("CARGO_PKG_VERSION"))
        .about("MusicXML part-list skeleton viewer")
        .arg(
            Arg::new("input")
                .help("Input file (.musicxml or .xml)")
                .required(true)
                .value_name("INPUT_FILE")
                .index(1),
        )
        .arg(
            Arg::new("verbose")
                .help("Also print the part-group descriptor ledger")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let input_file = matches.get_one::<String>("input").unwrap();
    let verbose = matches.get_flag("verbose");

    let content = std::fs::read_to_string(input_file)
        .with_context(|| format!("Failed to read input file: {}", input_file))?;
    let events = msr::parse_part_list(&content)
        .with_context(|| format!("Failed to parse MusicXML file: {}", input_file))?;
    let skeleton = msr::build_skeleton(events)
        .with_context(|| format!("Failed to build score skeleton: {}", input_file))?;

    print!("{}", skeleton);

    if verbose {
        println!();
        println!("descriptors:");
        for (index, descriptor) in skeleton.descriptors.iter().enumerate() {
            println!("  #{} {}", index, descriptor);
        }
    }

    for diagnostic in &skeleton.diagnostics {
        eprintln!("warning: {}", diagnostic);
    }

    Ok(())
}
