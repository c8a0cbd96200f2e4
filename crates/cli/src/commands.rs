use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use cluster::{upload_dir, ClusterClient, ClusterService, ContentStore};
use corelib::{HashRing, NodeAddr};
use tracing::info;

use crate::config::{AdminAction, Command, ObjectAction};

/// Client-side timeout for calls to the cluster service. Membership changes
/// migrate data before answering, so this is generous.
const SERVICE_TIMEOUT: Duration = Duration::from_secs(600);

pub async fn run(command: Command) -> Result<()> {
    match command {
        Command::Node(args) => {
            let config = args.into_config();
            storage::serve(&config)
                .await
                .with_context(|| format!("storage node on {}", config.bind_addr))
        }
        Command::Serve(args) => {
            let config = args.into_config()?;
            let service = ClusterService::from_config(&config).await?;
            service.serve(&config).await?;
            Ok(())
        }
        Command::Admin { server, action } => admin(&server, action).await,
        Command::Object { server, action } => object(&server, action).await,
        Command::Hash { value, nodes } => {
            println!("{}", hash_report(&value, &nodes)?);
            Ok(())
        }
    }
}

async fn connect(server: &str) -> Result<ClusterClient> {
    ClusterClient::connect(server, Some(SERVICE_TIMEOUT))
        .await
        .with_context(|| format!("connecting to cluster service at {server}"))
}

async fn admin(server: &str, action: AdminAction) -> Result<()> {
    let client = connect(server).await?;
    match action {
        AdminAction::List { json } => {
            let nodes = client.list_nodes().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&nodes)?);
            } else {
                for node in nodes {
                    println!(
                        "{:016x}  {:>6.2}%  {}",
                        node.token,
                        node.ownership * 100.0,
                        node.address
                    );
                }
            }
        }
        AdminAction::Add { node } => {
            let (migrated, failed) = client.add_node(&node).await?;
            info!(%node, migrated, failed, "node added");
            println!("added {node}: migrated {migrated} files, {failed} failed");
        }
        AdminAction::Remove { node } => {
            let (migrated, failed) = client.remove_node(&node).await?;
            info!(%node, migrated, failed, "node removed");
            println!("removed {node}: migrated {migrated} files, {failed} failed");
        }
        AdminAction::Rebalance { node } => {
            let (migrated, failed) = client.rebalance(&node).await?;
            info!(%node, migrated, failed, "node rebalanced");
            println!("rebalanced {node}: migrated {migrated} files, {failed} failed");
        }
        AdminAction::Drain { node } => {
            let (migrated, failed) = client.drain_node(&node).await?;
            info!(%node, migrated, failed, "node drained");
            println!("drained {node}: migrated {migrated} files, {failed} failed");
        }
    }
    Ok(())
}

async fn object(server: &str, action: ObjectAction) -> Result<()> {
    let client = connect(server).await?;
    match action {
        ObjectAction::Put { object_id, filename, file } => {
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let len = data.len();
            client.write(&object_id, &filename, data).await?;
            println!("stored {object_id}/{filename} ({len} bytes)");
        }
        ObjectAction::Get { object_id, filename, out } => {
            let data = client.read(&object_id, &filename).await?;
            match out {
                Some(path) => tokio::fs::write(&path, &data)
                    .await
                    .with_context(|| format!("writing {}", path.display()))?,
                None => std::io::stdout().lock().write_all(&data)?,
            }
        }
        ObjectAction::Delete { object_id, filename } => {
            client.delete(&object_id, &filename).await?;
            println!("deleted {object_id}/{filename}");
        }
        ObjectAction::Upload { object_id, dir } => {
            let store = RemoteStore(client);
            let names = upload_dir(&store, &object_id, &dir).await?;
            println!("uploaded {} files under {object_id}", names.len());
        }
    }
    Ok(())
}

/// Lets `upload_dir` write through the cluster service.
struct RemoteStore(ClusterClient);

#[async_trait]
impl ContentStore for RemoteStore {
    async fn read(&self, object_id: &str, filename: &str) -> cluster::ClusterResult<Vec<u8>> {
        self.0.read(object_id, filename).await
    }

    async fn write(&self, object_id: &str, filename: &str, data: Vec<u8>) -> cluster::ClusterResult<()> {
        self.0.write(object_id, filename, data).await
    }

    async fn delete(&self, object_id: &str, filename: &str) -> cluster::ClusterResult<()> {
        self.0.delete(object_id, filename).await
    }
}

/// Token of `value` and, when `nodes` is non-empty, the node owning it.
pub fn hash_report(value: &str, nodes: &[String]) -> Result<String> {
    let token = corelib::hash(value);
    if nodes.is_empty() {
        return Ok(format!("{token:016x}"));
    }
    let addrs = nodes
        .iter()
        .map(|n| NodeAddr::parse(n))
        .collect::<corelib::Result<Vec<_>>>()?;
    let ring = HashRing::from_nodes(&addrs)?;
    let owner = ring.owner(value)?;
    Ok(format!("{token:016x} -> {owner}"))
}
