//! CLI command definitions and dispatch
//!
//! Reads print the versioned payload as JSON on stdout; writes log their
//! outcome and rely on the exit code.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::info;

use bosun_core::{ConfigClient, ParentType, RuleType};
use bosun_models::{
    Backend, BackendSwitchingRule, Frontend, Listener, Server, Site, TcpContentRule,
    TransactionStatus,
};

#[derive(Args, Debug)]
pub struct ReadOpts {
    /// Read through a pending transaction's view
    #[arg(long)]
    pub transaction: Option<String>,
}

impl ReadOpts {
    fn transaction_id(&self) -> Option<&str> {
        self.transaction.as_deref()
    }
}

#[derive(Args, Debug)]
pub struct WriteOpts {
    /// Apply the change under a pending transaction
    #[arg(long, conflicts_with = "at_version")]
    pub transaction: Option<String>,

    /// Apply immediately, expecting this configuration version
    #[arg(long)]
    pub at_version: Option<i64>,
}

impl WriteOpts {
    fn transaction_id(&self) -> Option<&str> {
        self.transaction.as_deref()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the configuration version
    Version {
        #[command(flatten)]
        read: ReadOpts,
    },
    /// Transaction lifecycle
    #[command(subcommand)]
    Transaction(TransactionCommand),
    /// Sites
    #[command(subcommand)]
    Site(EntityCommand),
    /// Frontends
    #[command(subcommand)]
    Frontend(EntityCommand),
    /// Backends
    #[command(subcommand)]
    Backend(EntityCommand),
    /// Servers within a backend
    #[command(subcommand)]
    Server(ChildCommand),
    /// Listeners within a frontend
    #[command(subcommand)]
    Listener(ChildCommand),
    /// Backend switching rules within a frontend
    #[command(subcommand)]
    SwitchingRule(PositionalCommand),
    /// Tcp content rules within a frontend or backend
    #[command(subcommand)]
    TcpRule(TcpRuleCommand),
}

#[derive(Subcommand, Debug)]
pub enum TransactionCommand {
    /// Open a transaction against a baseline version
    Begin {
        /// Baseline version (defaults to the current one)
        #[arg(long)]
        at_version: Option<i64>,
    },
    /// Commit a transaction
    Commit { id: String },
    /// Abandon a transaction
    Abort { id: String },
    /// List transactions
    List {
        /// Filter by status (in_progress, failed)
        #[arg(long)]
        status: Option<String>,
    },
    /// Show one transaction
    Show { id: String },
}

#[derive(Subcommand, Debug)]
pub enum EntityCommand {
    /// List all entities
    List {
        #[command(flatten)]
        read: ReadOpts,
    },
    /// Show one entity by name
    Show {
        name: String,
        #[command(flatten)]
        read: ReadOpts,
    },
    /// Create from a JSON payload
    Create {
        data: String,
        #[command(flatten)]
        write: WriteOpts,
    },
    /// Edit from a JSON payload
    Edit {
        name: String,
        data: String,
        #[command(flatten)]
        write: WriteOpts,
    },
    /// Delete one entity by name
    Delete {
        name: String,
        #[command(flatten)]
        write: WriteOpts,
    },
}

#[derive(Subcommand, Debug)]
pub enum ChildCommand {
    /// List all entities under a parent
    List {
        parent: String,
        #[command(flatten)]
        read: ReadOpts,
    },
    /// Show one entity by name under a parent
    Show {
        parent: String,
        name: String,
        #[command(flatten)]
        read: ReadOpts,
    },
    /// Create under a parent from a JSON payload
    Create {
        parent: String,
        data: String,
        #[command(flatten)]
        write: WriteOpts,
    },
    /// Edit under a parent from a JSON payload
    Edit {
        parent: String,
        name: String,
        data: String,
        #[command(flatten)]
        write: WriteOpts,
    },
    /// Delete one entity by name from a parent
    Delete {
        parent: String,
        name: String,
        #[command(flatten)]
        write: WriteOpts,
    },
}

#[derive(Subcommand, Debug)]
pub enum PositionalCommand {
    /// List all rules in a frontend, in dump order
    List {
        frontend: String,
        #[command(flatten)]
        read: ReadOpts,
    },
    /// Show one rule by positional id
    Show {
        frontend: String,
        id: i64,
        #[command(flatten)]
        read: ReadOpts,
    },
    /// Create a rule from a JSON payload
    Create {
        frontend: String,
        data: String,
        #[command(flatten)]
        write: WriteOpts,
    },
    /// Edit a rule from a JSON payload
    Edit {
        frontend: String,
        id: i64,
        data: String,
        #[command(flatten)]
        write: WriteOpts,
    },
    /// Delete a rule by positional id
    Delete {
        frontend: String,
        id: i64,
        #[command(flatten)]
        write: WriteOpts,
    },
}

#[derive(Subcommand, Debug)]
pub enum TcpRuleCommand {
    /// List all rules of one type under a parent, in dump order
    List {
        /// Parent type (frontend, backend)
        parent_type: String,
        parent: String,
        /// Rule type (request, response)
        rule_type: String,
        #[command(flatten)]
        read: ReadOpts,
    },
    /// Show one rule by positional id
    Show {
        parent_type: String,
        parent: String,
        rule_type: String,
        id: i64,
        #[command(flatten)]
        read: ReadOpts,
    },
    /// Create a rule from a JSON payload
    Create {
        parent_type: String,
        parent: String,
        rule_type: String,
        data: String,
        #[command(flatten)]
        write: WriteOpts,
    },
    /// Edit a rule from a JSON payload
    Edit {
        parent_type: String,
        parent: String,
        rule_type: String,
        id: i64,
        data: String,
        #[command(flatten)]
        write: WriteOpts,
    },
    /// Delete a rule by positional id
    Delete {
        parent_type: String,
        parent: String,
        rule_type: String,
        id: i64,
        #[command(flatten)]
        write: WriteOpts,
    },
}

/// Run one parsed command against the client.
pub async fn dispatch(client: &ConfigClient, command: Command) -> Result<()> {
    match command {
        Command::Version { read } => {
            println!("{}", client.version(read.transaction_id()).await?);
            Ok(())
        }
        Command::Transaction(command) => transaction(client, command).await,
        Command::Site(command) => site(client, command).await,
        Command::Frontend(command) => frontend(client, command).await,
        Command::Backend(command) => backend(client, command).await,
        Command::Server(command) => server(client, command).await,
        Command::Listener(command) => listener(client, command).await,
        Command::SwitchingRule(command) => switching_rule(client, command).await,
        Command::TcpRule(command) => tcp_rule(client, command).await,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_payload<T: serde::de::DeserializeOwned>(data: &str) -> Result<T> {
    serde_json::from_str(data).context("Failed to parse JSON payload")
}

async fn transaction(client: &ConfigClient, command: TransactionCommand) -> Result<()> {
    match command {
        TransactionCommand::Begin { at_version } => {
            let version = match at_version {
                Some(version) => version,
                None => client.version(None).await?,
            };
            print_json(&client.start_transaction(version).await?)
        }
        TransactionCommand::Commit { id } => {
            let version = client.commit_transaction(&id).await?;
            println!("{}", version);
            Ok(())
        }
        TransactionCommand::Abort { id } => {
            client.abort_transaction(&id).await?;
            info!("Aborted transaction {}", id);
            Ok(())
        }
        TransactionCommand::List { status } => {
            let status: Option<TransactionStatus> =
                status.map(|status| status.parse()).transpose()?;
            print_json(&client.list_transactions(status).await?)
        }
        TransactionCommand::Show { id } => print_json(&client.get_transaction(&id).await?),
    }
}

async fn site(client: &ConfigClient, command: EntityCommand) -> Result<()> {
    match command {
        EntityCommand::List { read } => {
            print_json(&client.list_sites(read.transaction_id()).await?)
        }
        EntityCommand::Show { name, read } => {
            print_json(&client.get_site(&name, read.transaction_id()).await?)
        }
        EntityCommand::Create { data, write } => {
            let payload: Site = parse_payload(&data)?;
            client
                .create_site(&payload, write.transaction_id(), write.at_version)
                .await?;
            info!("Created site {}", payload.name);
            Ok(())
        }
        EntityCommand::Edit { name, data, write } => {
            let payload: Site = parse_payload(&data)?;
            client
                .edit_site(&name, &payload, write.transaction_id(), write.at_version)
                .await?;
            info!("Edited site {}", name);
            Ok(())
        }
        EntityCommand::Delete { name, write } => {
            client
                .delete_site(&name, write.transaction_id(), write.at_version)
                .await?;
            info!("Deleted site {}", name);
            Ok(())
        }
    }
}

async fn frontend(client: &ConfigClient, command: EntityCommand) -> Result<()> {
    match command {
        EntityCommand::List { read } => {
            print_json(&client.list_frontends(read.transaction_id()).await?)
        }
        EntityCommand::Show { name, read } => {
            print_json(&client.get_frontend(&name, read.transaction_id()).await?)
        }
        EntityCommand::Create { data, write } => {
            let payload: Frontend = parse_payload(&data)?;
            client
                .create_frontend(&payload, write.transaction_id(), write.at_version)
                .await?;
            info!("Created frontend {}", payload.name);
            Ok(())
        }
        EntityCommand::Edit { name, data, write } => {
            let payload: Frontend = parse_payload(&data)?;
            client
                .edit_frontend(&name, &payload, write.transaction_id(), write.at_version)
                .await?;
            info!("Edited frontend {}", name);
            Ok(())
        }
        EntityCommand::Delete { name, write } => {
            client
                .delete_frontend(&name, write.transaction_id(), write.at_version)
                .await?;
            info!("Deleted frontend {}", name);
            Ok(())
        }
    }
}

async fn backend(client: &ConfigClient, command: EntityCommand) -> Result<()> {
    match command {
        EntityCommand::List { read } => {
            print_json(&client.list_backends(read.transaction_id()).await?)
        }
        EntityCommand::Show { name, read } => {
            print_json(&client.get_backend(&name, read.transaction_id()).await?)
        }
        EntityCommand::Create { data, write } => {
            let payload: Backend = parse_payload(&data)?;
            client
                .create_backend(&payload, write.transaction_id(), write.at_version)
                .await?;
            info!("Created backend {}", payload.name);
            Ok(())
        }
        EntityCommand::Edit { name, data, write } => {
            let payload: Backend = parse_payload(&data)?;
            client
                .edit_backend(&name, &payload, write.transaction_id(), write.at_version)
                .await?;
            info!("Edited backend {}", name);
            Ok(())
        }
        EntityCommand::Delete { name, write } => {
            client
                .delete_backend(&name, write.transaction_id(), write.at_version)
                .await?;
            info!("Deleted backend {}", name);
            Ok(())
        }
    }
}

async fn server(client: &ConfigClient, command: ChildCommand) -> Result<()> {
    match command {
        ChildCommand::List { parent, read } => {
            print_json(&client.list_servers(&parent, read.transaction_id()).await?)
        }
        ChildCommand::Show { parent, name, read } => print_json(
            &client
                .get_server(&name, &parent, read.transaction_id())
                .await?,
        ),
        ChildCommand::Create {
            parent,
            data,
            write,
        } => {
            let payload: Server = parse_payload(&data)?;
            client
                .create_server(&parent, &payload, write.transaction_id(), write.at_version)
                .await?;
            info!("Created server {} in backend {}", payload.name, parent);
            Ok(())
        }
        ChildCommand::Edit {
            parent,
            name,
            data,
            write,
        } => {
            let payload: Server = parse_payload(&data)?;
            client
                .edit_server(
                    &name,
                    &parent,
                    &payload,
                    write.transaction_id(),
                    write.at_version,
                )
                .await?;
            info!("Edited server {} in backend {}", name, parent);
            Ok(())
        }
        ChildCommand::Delete {
            parent,
            name,
            write,
        } => {
            client
                .delete_server(&name, &parent, write.transaction_id(), write.at_version)
                .await?;
            info!("Deleted server {} from backend {}", name, parent);
            Ok(())
        }
    }
}

async fn listener(client: &ConfigClient, command: ChildCommand) -> Result<()> {
    match command {
        ChildCommand::List { parent, read } => print_json(
            &client
                .list_listeners(&parent, read.transaction_id())
                .await?,
        ),
        ChildCommand::Show { parent, name, read } => print_json(
            &client
                .get_listener(&name, &parent, read.transaction_id())
                .await?,
        ),
        ChildCommand::Create {
            parent,
            data,
            write,
        } => {
            let payload: Listener = parse_payload(&data)?;
            client
                .create_listener(&parent, &payload, write.transaction_id(), write.at_version)
                .await?;
            info!("Created listener {} in frontend {}", payload.name, parent);
            Ok(())
        }
        ChildCommand::Edit {
            parent,
            name,
            data,
            write,
        } => {
            let payload: Listener = parse_payload(&data)?;
            client
                .edit_listener(
                    &name,
                    &parent,
                    &payload,
                    write.transaction_id(),
                    write.at_version,
                )
                .await?;
            info!("Edited listener {} in frontend {}", name, parent);
            Ok(())
        }
        ChildCommand::Delete {
            parent,
            name,
            write,
        } => {
            client
                .delete_listener(&name, &parent, write.transaction_id(), write.at_version)
                .await?;
            info!("Deleted listener {} from frontend {}", name, parent);
            Ok(())
        }
    }
}

async fn switching_rule(client: &ConfigClient, command: PositionalCommand) -> Result<()> {
    match command {
        PositionalCommand::List { frontend, read } => print_json(
            &client
                .list_backend_switching_rules(&frontend, read.transaction_id())
                .await?,
        ),
        PositionalCommand::Show { frontend, id, read } => print_json(
            &client
                .get_backend_switching_rule(id, &frontend, read.transaction_id())
                .await?,
        ),
        PositionalCommand::Create {
            frontend,
            data,
            write,
        } => {
            let payload: BackendSwitchingRule = parse_payload(&data)?;
            client
                .create_backend_switching_rule(
                    &frontend,
                    &payload,
                    write.transaction_id(),
                    write.at_version,
                )
                .await?;
            info!("Created switching rule in frontend {}", frontend);
            Ok(())
        }
        PositionalCommand::Edit {
            frontend,
            id,
            data,
            write,
        } => {
            let payload: BackendSwitchingRule = parse_payload(&data)?;
            client
                .edit_backend_switching_rule(
                    id,
                    &frontend,
                    &payload,
                    write.transaction_id(),
                    write.at_version,
                )
                .await?;
            info!("Edited switching rule {} in frontend {}", id, frontend);
            Ok(())
        }
        PositionalCommand::Delete {
            frontend,
            id,
            write,
        } => {
            client
                .delete_backend_switching_rule(
                    id,
                    &frontend,
                    write.transaction_id(),
                    write.at_version,
                )
                .await?;
            info!("Deleted switching rule {} from frontend {}", id, frontend);
            Ok(())
        }
    }
}

async fn tcp_rule(client: &ConfigClient, command: TcpRuleCommand) -> Result<()> {
    match command {
        TcpRuleCommand::List {
            parent_type,
            parent,
            rule_type,
            read,
        } => {
            let parent_type: ParentType = parent_type.parse()?;
            let rule_type: RuleType = rule_type.parse()?;
            print_json(
                &client
                    .list_tcp_content_rules(
                        parent_type,
                        &parent,
                        rule_type,
                        read.transaction_id(),
                    )
                    .await?,
            )
        }
        TcpRuleCommand::Show {
            parent_type,
            parent,
            rule_type,
            id,
            read,
        } => {
            let parent_type: ParentType = parent_type.parse()?;
            let rule_type: RuleType = rule_type.parse()?;
            print_json(
                &client
                    .get_tcp_content_rule(
                        id,
                        parent_type,
                        &parent,
                        rule_type,
                        read.transaction_id(),
                    )
                    .await?,
            )
        }
        TcpRuleCommand::Create {
            parent_type,
            parent,
            rule_type,
            data,
            write,
        } => {
            let parent_type: ParentType = parent_type.parse()?;
            let rule_type: RuleType = rule_type.parse()?;
            let payload: TcpContentRule = parse_payload(&data)?;
            client
                .create_tcp_content_rule(
                    parent_type,
                    &parent,
                    rule_type,
                    &payload,
                    write.transaction_id(),
                    write.at_version,
                )
                .await?;
            info!("Created tcp content rule in {} {}", parent_type, parent);
            Ok(())
        }
        TcpRuleCommand::Edit {
            parent_type,
            parent,
            rule_type,
            id,
            data,
            write,
        } => {
            let parent_type: ParentType = parent_type.parse()?;
            let rule_type: RuleType = rule_type.parse()?;
            let payload: TcpContentRule = parse_payload(&data)?;
            client
                .edit_tcp_content_rule(
                    id,
                    parent_type,
                    &parent,
                    rule_type,
                    &payload,
                    write.transaction_id(),
                    write.at_version,
                )
                .await?;
            info!("Edited tcp content rule {} in {} {}", id, parent_type, parent);
            Ok(())
        }
        TcpRuleCommand::Delete {
            parent_type,
            parent,
            rule_type,
            id,
            write,
        } => {
            let parent_type: ParentType = parent_type.parse()?;
            let rule_type: RuleType = rule_type.parse()?;
            client
                .delete_tcp_content_rule(
                    id,
                    parent_type,
                    &parent,
                    rule_type,
                    write.transaction_id(),
                    write.at_version,
                )
                .await?;
            info!(
                "Deleted tcp content rule {} from {} {}",
                id, parent_type, parent
            );
            Ok(())
        }
    }
}
