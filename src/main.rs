use clap::Parser;
use promptstash::cli::{
    handle_add_component, handle_add_prompt, handle_add_tag, handle_delete, handle_export,
    handle_generate, handle_get, handle_import, handle_init, handle_list, handle_update,
    handle_validate, AddRecord, Cli, Commands,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => handle_init(),
        Commands::Add(add) => match add.record {
            AddRecord::Prompt {
                title,
                kind,
                content,
                template,
                variables,
                tag_ids,
                stdin,
                json,
            } => handle_add_prompt(title, kind, content, template, variables, tag_ids, stdin, json),
            AddRecord::Component {
                name,
                kind,
                category,
                content,
                stdin,
                json,
            } => handle_add_component(name, kind, category, content, stdin, json),
            AddRecord::Tag { name, color, json } => handle_add_tag(name, color, json),
        },
        Commands::List { what, kind, json } => handle_list(what, kind, json),
        Commands::Get { id, json } => handle_get(id, json),
        Commands::Update {
            id,
            title,
            content,
            kind,
            template,
            variables,
            clear_variables,
            tag_ids,
            json,
        } => handle_update(
            id,
            title,
            content,
            kind,
            template,
            variables,
            clear_variables,
            tag_ids,
            json,
        ),
        Commands::Delete { what, id } => handle_delete(what, id),
        Commands::Generate {
            template_id,
            variables,
            components,
            json,
        } => handle_generate(template_id, variables, components, json),
        Commands::Validate { file, json } => handle_validate(file, json),
        Commands::Import { file, json } => handle_import(file, json),
        Commands::Export { id } => handle_export(id),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
