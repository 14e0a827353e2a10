use clap::{Arg, ArgMatches, Command};
use env_logger::{Builder, Env, Target};

#[macro_use]
extern crate log;

use hcloud_deploy::allowlist;
use hcloud_deploy::config::{DeleteConfig, KeyConfig, ServerConfig};
use hcloud_deploy::error::DeployError;
use hcloud_deploy::hcloud::{HcloudClient, ServerSpec};
use hcloud_deploy::keys;
use hcloud_deploy::provision::{provision, SystemClock, WaitPolicy};
use hcloud_deploy::reaper;

fn cli() -> Command<'static> {
    Command::new("hcloud-deploy")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Provisions Hetzner Cloud servers, SSH keys and firewalls for deployment pipelines")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("create-server")
                .about("Create a server and wait until it reports 'running'"),
        )
        .subcommand(
            Command::new("create-ssh-key").about("Create or replace an account SSH key"),
        )
        .subcommand(
            Command::new("firewall")
                .about("Restrict every server to an IP allowlist firewall")
                .arg(Arg::new("token").help("Hetzner Cloud API token").index(1))
                .arg(
                    Arg::new("allowed-ips")
                        .help("Comma-separated list of allowed source IPs")
                        .index(2),
                ),
        )
        .subcommand(
            Command::new("delete-server")
                .about("Delete the server named by HCLOUD_SERVER_NAME, or ALL servers"),
        )
}

fn main() {
    // Progress lines share stdout with the KEY=VALUE output, so pipeline
    // logs show both in order.
    let env = Env::default().filter_or("RUST_LOG", "info");
    Builder::from_env(env).target(Target::Stdout).init();

    let matches = cli().get_matches();
    let code = match matches.subcommand() {
        Some(("create-server", _)) => cmd_create_server(),
        Some(("create-ssh-key", _)) => cmd_create_ssh_key(),
        Some(("firewall", sub)) => cmd_firewall(sub),
        Some(("delete-server", _)) => cmd_delete_server(),
        _ => unreachable!("subcommand is required"),
    };
    std::process::exit(code);
}

fn fatal(err: &DeployError) -> i32 {
    println!("Error: {}", err);
    err.exit_code()
}

fn cmd_create_server() -> i32 {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => return fatal(&e),
    };
    info!(
        "Using configuration: Server name='{}', type='{}', image='{}', ssh_key='{}', timeout={}s",
        config.name,
        config.server_type,
        config.image,
        config.ssh_key_name.as_deref().unwrap_or("None"),
        config.wait_timeout_secs
    );
    let client = HcloudClient::new(&config.token);
    let spec = ServerSpec {
        name: config.name,
        server_type: config.server_type,
        image: config.image,
        ssh_key_name: config.ssh_key_name,
    };
    let policy = WaitPolicy::with_timeout(config.wait_timeout_secs);
    match provision(&client, &SystemClock, &spec, &policy) {
        Ok(result) => {
            let ip = result.server.ipv4_address().unwrap_or_default().to_string();
            println!("SERVER_IP={}", ip);
            match result.root_password {
                Some(password) => println!("ROOT_PASS={}", password),
                None => println!("Using SSH key authentication (no password)"),
            }
            info!("Server deployed successfully at IP: {}", ip);
            0
        }
        Err(e @ DeployError::ProvisionTimeout { .. }) => {
            println!("Timeout Error: {}", e);
            e.exit_code()
        }
        Err(e) => fatal(&e),
    }
}

fn cmd_create_ssh_key() -> i32 {
    let config = match KeyConfig::from_env() {
        Ok(config) => config,
        Err(e) => return fatal(&e),
    };
    let client = HcloudClient::new(&config.token);
    match keys::ensure_key(&client, &config.key_name, &config.public_key) {
        Ok(name) => {
            println!("SSH_KEY_NAME={}", name);
            0
        }
        Err(e) => fatal(&e),
    }
}

fn cmd_firewall(matches: &ArgMatches) -> i32 {
    // Arguments are validated by hand rather than marked required, so a
    // missing argument exits 1 like the other configuration errors.
    let (token, raw_ips) = match (
        matches.get_one::<String>("token"),
        matches.get_one::<String>("allowed-ips"),
    ) {
        (Some(token), Some(raw_ips)) => (token, raw_ips),
        _ => {
            println!("Usage: hcloud-deploy firewall <HCLOUD_TOKEN> <allowed_ips_comma_separated>");
            return 1;
        }
    };
    let allowed_ips = allowlist::parse_allowed_ips(raw_ips);
    if allowed_ips.is_empty() {
        println!("Error: allowed IP list is empty");
        return 1;
    }
    let client = HcloudClient::new(token);
    match allowlist::apply_allowlist(&client, &allowed_ips) {
        Ok(()) => 0,
        Err(e) => fatal(&e),
    }
}

fn cmd_delete_server() -> i32 {
    let config = match DeleteConfig::from_env() {
        Ok(config) => config,
        Err(e) => return fatal(&e),
    };
    match &config.name {
        Some(name) => info!("Using configuration: Server name='{}'", name),
        None => info!("No server name specified, will delete ALL servers"),
    }
    let client = HcloudClient::new(&config.token);
    match reaper::delete_servers(&client, config.name.as_deref()) {
        Ok(_removed) => 0,
        Err(e) => fatal(&e),
    }
}
