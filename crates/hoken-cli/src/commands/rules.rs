//! Rules command - inspect and validate pattern tables.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use hoken_core::rules::{self, builtin};
use hoken_core::Role;

/// Arguments for the rules command.
#[derive(Args)]
pub struct RulesArgs {
    #[command(subcommand)]
    action: RulesAction,
}

#[derive(Subcommand)]
enum RulesAction {
    /// List the builtin pattern table's roles and variants
    List,
    /// Validate a custom pattern table file
    Validate {
        /// Path to JSON pattern table
        file: PathBuf,
    },
}

pub fn run(args: RulesArgs) -> anyhow::Result<()> {
    match args.action {
        RulesAction::List => {
            let table = builtin::insurance_card()?;
            println!("{} v{}", table.name, table.version);
            for role in Role::ALL {
                let variants = table.roles.get(&role).map(Vec::len).unwrap_or(0);
                println!("  {role}: {variants} pattern variant(s)");
            }
        }
        RulesAction::Validate { file } => {
            let table = rules::load_table(&file)?;
            println!(
                "{} v{} is valid ({} roles)",
                table.name,
                table.version,
                table.roles.len()
            );
        }
    }
    Ok(())
}
