use alloy_primitives::Address as EvmAddress;
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use kakarot_e2e::{
    definitions::network_config::NetworkConfig,
    utils::{evm_address_to_felt, starknet_selector, string_to_felt, Address},
};
use rpc_state_reader::{
    account_snapshot, registry_snapshot,
    rpc_state::{BlockTag, BlockValue, RpcState},
};
use tracing::info;

#[derive(Debug, Parser)]
#[command(about = "Inspect the class hashes of a live Kakarot deployment.", long_about = None)]
struct InspectCLI {
    /// Kakarot contract address.
    #[arg(long)]
    kakarot: String,
    /// Block number to read at, latest when omitted.
    #[arg(long)]
    block: Option<u64>,
    #[command(subcommand)]
    subcommand: InspectSubCommand,
}

#[derive(Subcommand, Debug)]
enum InspectSubCommand {
    #[clap(about = "Print the class hashes the registry hands out.")]
    Registry,
    #[clap(about = "Print the classes an account runs, given its EVM address.")]
    Account { evm_address: String },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = InspectCLI::parse();

    let config = NetworkConfig::from_env()?;
    let block = cli
        .block
        .map(BlockValue::from)
        .unwrap_or(BlockValue::Tag(BlockTag::Latest));
    let state = RpcState::from_config(&config, block)?;
    let kakarot = Address(string_to_felt(&cli.kakarot)?);
    info!(endpoint = state.rpc_endpoint(), %kakarot, ?block, "inspecting");

    let registry = registry_snapshot(&state, kakarot)?;
    match cli.subcommand {
        InspectSubCommand::Registry => {
            println!("owner                    {}", registry.owner);
            println!("account_contract         {}", registry.account_contract_class_hash);
            println!("Cairo1Helpers            {}", registry.cairo1_helpers_class_hash);
            println!("uninitialized_account    {}", registry.uninitialized_account_class_hash);
        }
        InspectSubCommand::Account { evm_address } => {
            let evm_address: EvmAddress = evm_address
                .parse()
                .with_context(|| format!("invalid EVM address {evm_address}"))?;
            let selector = starknet_selector("get_starknet_address")?;
            let address = match state.call(&kakarot, selector, &[evm_address_to_felt(&evm_address)])?[..] {
                [address] => Address(address),
                _ => bail!("unexpected get_starknet_address output"),
            };

            let account = account_snapshot(&state, address)?;
            println!("starknet address         {address}");
            println!("class                    {}", account.class_hash);
            println!("Cairo1Helpers            {}", account.cairo1_helpers_class_hash);
            println!("nonce                    {:#x}", account.nonce);
            println!(
                "up to date               {}",
                account.is_up_to_date(&registry)
            );
        }
    }
    Ok(())
}
