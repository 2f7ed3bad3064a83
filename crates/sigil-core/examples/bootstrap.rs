//! Bootstrap a wallet from a fresh backup phrase
//! Run with: cargo run --example bootstrap

use anyhow::Result;
use sigil_core::{
    backup_phrase_to_seed, generate_backup_phrase, generate_identities, Keychain,
};

fn main() -> Result<()> {
    env_logger::init();

    let mnemonic = generate_backup_phrase()?;
    println!("=== NEW WALLET ===\n");
    println!("Backup phrase (write this down):\n");
    println!("{}\n", mnemonic);

    let seed = backup_phrase_to_seed(&mnemonic);
    let master = Keychain::from_seed(&seed)?;

    let batch = generate_identities(&master, 3)?;

    println!("First Bitcoin address: {}\n", batch.first_bitcoin_address);
    println!("Identity addresses:");
    for (index, address) in batch.identity_addresses.iter().enumerate() {
        println!("  #{index}: {address}");
    }

    let keypair = &batch.identity_keypairs[0];
    println!("\nIdentity #0 key ID: {}", keypair.key_id);
    println!("Identity #0 apps node: {}", keypair.apps_node_key);

    Ok(())
}
