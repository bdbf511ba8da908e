//! Interface inspection CLI.
//!
//! **Key modes**
//! - Parse an interface file to JSON: `mast parse app.idl`
//! - Resolve a scope's canonical type registry: `mast types app.idl [--service Name]`
//! - Decode/build message headers: `mast header decode <hex>`, `mast header encode --interface-id ...`
//! - Encode a call payload: `mast call app.idl --service Name --func Fn [--args-hex ...]`
//!
//! All output is JSON (or plain hex for byte-producing commands) so
//! results are diff-friendly and scriptable.
use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::fs;
use std::path::Path;

use mast_client::ServiceDispatch;
use mast_idl::IdlDocument;
use mast_resolver::TypeResolver;
use mast_types::{InterfaceId, MessageHeader};

mod args;

use args::{Args, Command, HeaderCommand};

fn main() -> Result<()> {
    let args = Args::parse();
    match args.command {
        Command::Parse { file } => {
            let doc = load_document(&file)?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        Command::Types { file, service } => {
            let doc = load_document(&file)?;
            let resolver = match service.as_deref() {
                Some(name) => {
                    let service = doc
                        .service(name)
                        .with_context(|| format!("no service named '{name}'"))?;
                    TypeResolver::new(doc.types_in_scope(service))?
                }
                None => TypeResolver::new(doc.program.types.iter())?,
            };
            let mut registry = serde_json::Map::new();
            for (name, wire) in resolver.registry() {
                registry.insert(name, serde_json::to_value(&wire)?);
            }
            println!("{}", serde_json::to_string_pretty(&registry)?);
        }
        Command::Header(HeaderCommand::Decode { hex }) => {
            let bytes = hex::decode(hex.trim_start_matches("0x")).context("decoding hex")?;
            let (header, body_start) = MessageHeader::read_at(&bytes, 0)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "version": header.version,
                    "hlen": header.hlen,
                    "interface_id": header.interface_id.to_string(),
                    "entry_id": header.entry_id,
                    "route_idx": header.route_idx,
                    "body_len": bytes.len() - body_start,
                }))?
            );
        }
        Command::Header(HeaderCommand::Encode {
            interface_id,
            entry_id,
            route_idx,
        }) => {
            let interface_id: InterfaceId =
                interface_id.parse().context("parsing interface id")?;
            let header = MessageHeader::v1(interface_id, entry_id, route_idx);
            println!("{}", hex::encode(header.to_bytes()));
        }
        Command::Call {
            file,
            service,
            func,
            route_idx,
            args_hex,
        } => {
            let doc = load_document(&file)?;
            let dispatch = ServiceDispatch::build(&doc, &service, route_idx)?;
            let body = hex::decode(args_hex.trim_start_matches("0x"))
                .context("decoding argument hex")?;
            let mut payload = dispatch.func(&func)?.header.to_bytes();
            payload.extend(body);
            println!("{}", hex::encode(payload));
        }
    }
    Ok(())
}

fn load_document(path: &Path) -> Result<IdlDocument> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    mast_idl::parse(&text).with_context(|| format!("parsing {}", path.display()))
}
