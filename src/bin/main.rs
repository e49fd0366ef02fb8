use clap::{Parser, Subcommand};
use contact_consensus_rs::config::{DEFAULT_CUTOFF, DEFAULT_MIN_RESIDUE_SEPARATION};
use contact_consensus_rs::contacts::save_frequency_table;
use contact_consensus_rs::error::ensure_paths_exist;
use contact_consensus_rs::{
    generate_label_table, label_contacts, load_label_map, load_raw_contacts, merge_frequency_files,
    save_consensus_to_tsv, save_label_table, LabelConfig, MergeConfig, TsvTableLoader,
};
use std::path::PathBuf;

/// Command-line tool for consolidating residue contact frequencies across simulation runs
#[derive(Parser)]
#[command(name = "contact-consensus")]
#[command(
    about = "Merge contact frequency tables from independent simulation runs",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge labeled frequency tables and report mean and stdev per contact
    Merge {
        /// Labeled frequency TSV files to merge
        #[arg(short = 'i', required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Output TSV path
        #[arg(short = 'o')]
        output: PathBuf,

        /// Contacts with mean frequency not above this value are dropped (default: 0.1)
        #[arg(short = 'c', default_value_t = DEFAULT_CUTOFF, allow_negative_numbers = true)]
        cutoff: f64,

        /// Sort the output by descending mean frequency
        #[arg(long)]
        sort: bool,
    },

    /// Attach structural-position labels to a raw contact frequency file
    Label {
        /// Raw contact frequency file of one run
        #[arg(short = 'i')]
        input: PathBuf,

        /// Label table (native, label, color)
        #[arg(short = 'l')]
        labels: PathBuf,

        /// Output TSV path
        #[arg(short = 'o')]
        output: PathBuf,

        /// Minimum residue number separation of a kept contact (default: 4)
        #[arg(short = 'c', default_value_t = DEFAULT_MIN_RESIDUE_SEPARATION)]
        min_separation: u32,
    },

    /// Generate a label table for one receptor from a reference numbering CSV
    GenLabel {
        /// Reference numbering CSV
        #[arg(short = 'i')]
        input: PathBuf,

        /// Output label TSV path
        #[arg(short = 'o')]
        output: PathBuf,

        /// Receptor column name, e.g. "5-HT1A receptor Human"
        #[arg(short = 'n')]
        name: String,

        /// Chain ID of the receptor
        #[arg(short = 'c', default_value = "A")]
        chain: String,

        /// Offset added to every residue number
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i32,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Merge {
            inputs,
            output,
            cutoff,
            sort,
        } => {
            println!("Merging {} frequency tables", inputs.len());
            println!("Cutoff: {}", cutoff);

            let config = MergeConfig { cutoff, sort };
            let rows = match merge_frequency_files(&TsvTableLoader, &inputs, &config) {
                Ok(rows) => {
                    println!("✅ {} contacts above cutoff", rows.len());
                    rows
                }
                Err(e) => {
                    eprintln!("❌ Error merging frequency tables: {}", e);
                    std::process::exit(1);
                }
            };

            if let Err(e) = save_consensus_to_tsv(&rows, &output) {
                eprintln!("❌ Error writing output: {}", e);
                std::process::exit(1);
            }
            println!("📄 Consensus saved to: {:?}", output);
        }

        Commands::Label {
            input,
            labels,
            output,
            min_separation,
        } => {
            println!("Labeling contacts: {:?}", input);
            println!("Using labels: {:?}", labels);

            if let Err(e) = ensure_paths_exist(&[&input, &labels]) {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }

            let label_map = match load_label_map(&labels) {
                Ok(m) => {
                    println!("✅ Loaded {} labels", m.len());
                    m
                }
                Err(e) => {
                    eprintln!("❌ Error loading labels: {}", e);
                    std::process::exit(1);
                }
            };

            let config = LabelConfig {
                min_residue_separation: min_separation,
            };
            let labeled = load_raw_contacts(&input)
                .and_then(|table| label_contacts(table, &label_map, &config))
                .and_then(|table| save_frequency_table(&table, &output).map(|_| table));

            match labeled {
                Ok(table) => {
                    println!("✅ Labeled {} contacts", table.len());
                    println!("📄 Labeled table saved to: {:?}", output);
                }
                Err(e) => {
                    eprintln!("❌ Error labeling contacts: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::GenLabel {
            input,
            output,
            name,
            chain,
            offset,
        } => {
            println!("Reading reference table: {:?}", input);
            println!("Receptor: {}", name);

            if let Err(e) = ensure_paths_exist(&[&input]) {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }

            let generated = generate_label_table(&input, &name, &chain, offset)
                .and_then(|entries| save_label_table(&entries, &output).map(|_| entries));

            match generated {
                Ok(entries) => {
                    println!("✅ Generated {} labels", entries.len());
                    println!("📄 Label table saved to: {:?}", output);
                }
                Err(e) => {
                    eprintln!("❌ Error generating labels: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_accepts_negative_cutoff() {
        let cli = Cli::try_parse_from([
            "contact-consensus", "merge", "-i", "a.tsv", "b.tsv", "-o", "out.tsv", "-c", "-0.05",
        ])
        .unwrap();
        match cli.command {
            Commands::Merge { inputs, cutoff, .. } => {
                assert_eq!(inputs.len(), 2);
                assert_eq!(cutoff, -0.05);
            }
            _ => panic!("expected merge subcommand"),
        }
    }
}
