//! CLI command for listing the built-in bots.

use planetwars::bots::BUILTIN_BOTS;

/// Execute the `bots` command.
pub(crate) fn execute() {
    println!("Built-in bots:");
    println!();
    for (name, description) in BUILTIN_BOTS {
        println!("  {name:<24} {description}");
    }
}
