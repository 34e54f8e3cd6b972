//! Command-line interface for wsdl20

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use wsdl20::{ComponentModel, Error, Wsdl, WsdlReader};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "wsdl20")]
#[command(author, version, about = "WSDL 2.0 description reader", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Read a description and display its components
    Inspect {
        /// Path to the WSDL 2.0 document
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,

        /// Skip the structural validation pass
        #[arg(long)]
        no_validate: bool,
    },

    /// Print the fragment identifier of every component
    Fragments {
        /// Path to the WSDL 2.0 document
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[cfg(feature = "cli")]
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect {
            file,
            json,
            no_validate,
        } => cmd_inspect(file, json, !no_validate),
        Commands::Fragments { file } => cmd_fragments(file),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn read(file: &Path, validate: bool) -> Result<Wsdl, Error> {
    WsdlReader::new().with_validation(validate).read_file(file)
}

#[cfg(feature = "cli")]
fn cmd_inspect(file: PathBuf, json_output: bool, validate: bool) -> Result<(), Box<dyn std::error::Error>> {
    let wsdl = read(&file, validate)?;
    let model = wsdl.to_component();

    if json_output {
        print_json(&wsdl, model)?;
        return Ok(());
    }

    let description = wsdl.description();
    println!("wsdl20 v{}", wsdl20::VERSION);
    println!();
    println!("Description:");
    println!("  Document: {}", description.document_base_uri);
    match &description.target_namespace {
        Some(ns) => println!("  Target Namespace: {}", ns),
        None => println!("  Target Namespace: (none)"),
    }
    println!("  Documents Read: {}", wsdl.descriptions().len());
    println!();
    println!("Statistics:");
    println!("  Interfaces: {}", model.interfaces().len());
    println!("  Bindings: {}", model.bindings().len());
    println!("  Services: {}", model.services().len());
    println!("  Element Declarations: {}", model.element_declarations().count());
    println!(
        "  Type Definitions: {}",
        model.type_definitions().filter(|t| !t.content.is_builtin()).count()
    );

    if !model.interfaces().is_empty() {
        println!("\n=== Interfaces ===");
        for interface in model.interfaces() {
            println!("  {}", interface.name);
            for operation in model.all_operations(interface) {
                println!("    operation {} ({})", operation.name.local_name, operation.pattern);
                for id in &operation.interface_message_references {
                    let message = &model[*id];
                    let label = message.message_label.as_ref().map_or("?", |l| l.as_str());
                    println!("      {} {} : {}", message.direction, label, message.message_content_model());
                }
            }
        }
    }

    if !model.bindings().is_empty() {
        println!("\n=== Bindings ===");
        for binding in model.bindings() {
            let interface = binding.interface.as_ref().map(|q| q.to_string());
            println!(
                "  {} -> {} [{}]",
                binding.name,
                interface.as_deref().unwrap_or("(none)"),
                binding.binding_type.as_deref().unwrap_or("")
            );
        }
    }

    if !model.services().is_empty() {
        println!("\n=== Services ===");
        for service in model.services() {
            println!("  {}", service.name);
            for id in &service.endpoints {
                let endpoint = &model[*id];
                println!(
                    "    endpoint {} {}",
                    endpoint.name.as_str(),
                    endpoint.address.as_deref().unwrap_or("")
                );
            }
        }
    }

    if !wsdl.diagnostics().is_empty() {
        println!("\n=== Diagnostics ===");
        for diagnostic in wsdl.diagnostics() {
            println!("  {}", diagnostic);
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_json(wsdl: &Wsdl, model: &ComponentModel) -> Result<(), Box<dyn std::error::Error>> {
    use serde_json::{json, Map, Value};

    let description = wsdl.description();
    let mut output = Map::new();
    output.insert("document".to_string(), json!(description.document_base_uri.as_str()));
    output.insert("targetNamespace".to_string(), json!(description.target_namespace));

    let interfaces: Vec<Value> = model
        .interfaces()
        .iter()
        .map(|interface| {
            let operations: Vec<Value> = model
                .all_operations(interface)
                .into_iter()
                .map(|operation| {
                    let messages: Vec<Value> = operation
                        .interface_message_references
                        .iter()
                        .map(|id| {
                            let message = &model[*id];
                            json!({
                                "direction": message.direction,
                                "messageLabel": message.message_label,
                                "element": message.element.as_ref().map(|e| e.to_string()),
                            })
                        })
                        .collect();
                    json!({
                        "name": operation.name.to_string(),
                        "pattern": operation.pattern,
                        "style": operation.style,
                        "messages": messages,
                    })
                })
                .collect();
            json!({
                "name": interface.name.to_string(),
                "extends": interface.extends.iter().map(|q| q.to_string()).collect::<Vec<_>>(),
                "operations": operations,
            })
        })
        .collect();
    output.insert("interfaces".to_string(), Value::Array(interfaces));

    let bindings: Vec<Value> = model
        .bindings()
        .iter()
        .map(|binding| {
            json!({
                "name": binding.name.to_string(),
                "interface": binding.interface.as_ref().map(|q| q.to_string()),
                "type": binding.binding_type,
                "extensions": binding.extensions.namespaces().collect::<Vec<_>>(),
            })
        })
        .collect();
    output.insert("bindings".to_string(), Value::Array(bindings));

    let services: Vec<Value> = model
        .services()
        .iter()
        .map(|service| {
            let endpoints: Vec<Value> = service
                .endpoints
                .iter()
                .map(|id| {
                    let endpoint = &model[*id];
                    json!({
                        "name": endpoint.name.as_str(),
                        "binding": endpoint.binding.as_ref().map(|q| q.to_string()),
                        "address": endpoint.address,
                    })
                })
                .collect();
            json!({
                "name": service.name.to_string(),
                "interface": service.interface.as_ref().map(|q| q.to_string()),
                "endpoints": endpoints,
            })
        })
        .collect();
    output.insert("services".to_string(), Value::Array(services));

    let elements: Vec<String> = model.element_declarations().map(|e| e.name.to_string()).collect();
    output.insert("elementDeclarations".to_string(), json!(elements));

    let diagnostics: Vec<Value> = wsdl
        .diagnostics()
        .iter()
        .map(|d| {
            json!({
                "severity": d.severity.to_string(),
                "code": d.code.as_str(),
                "message": d.to_string(),
            })
        })
        .collect();
    output.insert("diagnostics".to_string(), Value::Array(diagnostics));

    println!("{}", serde_json::to_string_pretty(&Value::Object(output))?);
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_fragments(file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let wsdl = read(&file, false)?;
    let model = wsdl.to_component();
    for component in model.component_refs() {
        println!("{}", model.fragment_identifier(&component));
    }
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
