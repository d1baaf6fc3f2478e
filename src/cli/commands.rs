use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "promptstash")]
#[command(version, about = "A local prompt library with templates and composable components")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new promptstash project in the current directory
    Init,

    /// Add a new prompt, component, or tag
    Add(AddCommand),

    /// List stored records
    List {
        /// What to list: prompts, templates, components, or tags
        #[arg(value_name = "WHAT", default_value = "prompts")]
        what: String,

        /// Only components of this type (chatgpt, midjourney)
        #[arg(long)]
        kind: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single prompt by id
    Get {
        id: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update a prompt
    Update {
        id: i64,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New content
        #[arg(long)]
        content: Option<String>,

        /// New target type (chatgpt, midjourney)
        #[arg(long = "type")]
        kind: Option<String>,

        /// Set or clear the template flag
        #[arg(long)]
        template: Option<bool>,

        /// Replace the declared variables (can be specified multiple times)
        #[arg(long = "variable", short = 'v')]
        variables: Vec<String>,

        /// Clear the declared variable list
        #[arg(long, conflicts_with = "variables")]
        clear_variables: bool,

        /// Replace tag associations (can be specified multiple times)
        #[arg(long = "tag-id", short = 't')]
        tag_ids: Vec<i64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a prompt, component, or tag
    Delete {
        /// Record type: prompt, component, or tag
        #[arg(value_name = "WHAT")]
        what: String,

        id: i64,
    },

    /// Generate content from a stored template
    Generate {
        template_id: i64,

        /// Variable value in NAME=VALUE form (can be specified multiple times)
        #[arg(long = "var", short = 'v')]
        variables: Vec<String>,

        /// Component id to append (can be specified multiple times)
        #[arg(long = "component", short = 'c')]
        components: Vec<i64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a JSON prompt record without storing it
    Validate {
        /// Path to a JSON file (reads stdin when omitted)
        file: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate and store a JSON prompt record
    Import {
        /// Path to a JSON file (reads stdin when omitted)
        file: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export a prompt as JSON
    Export { id: i64 },
}

#[derive(Args, Debug)]
pub struct AddCommand {
    #[command(subcommand)]
    pub record: AddRecord,
}

#[derive(Subcommand, Debug)]
pub enum AddRecord {
    /// Add a new prompt
    Prompt {
        title: String,

        /// Target type (chatgpt, midjourney)
        #[arg(long = "type", default_value = "chatgpt")]
        kind: String,

        /// Prompt content (reads stdin when omitted)
        #[arg(long)]
        content: Option<String>,

        /// Mark the prompt as a template
        #[arg(long)]
        template: bool,

        /// Declared template variable (can be specified multiple times)
        #[arg(long = "variable", short = 'v')]
        variables: Vec<String>,

        /// Tag id to associate (can be specified multiple times)
        #[arg(long = "tag-id", short = 't')]
        tag_ids: Vec<i64>,

        /// Read content from stdin
        #[arg(long)]
        stdin: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a reusable component
    Component {
        name: String,

        /// Target type (chatgpt, midjourney)
        #[arg(long = "type", default_value = "chatgpt")]
        kind: String,

        /// Free-form category label
        #[arg(long, default_value = "general")]
        category: String,

        /// Component content (reads stdin when omitted)
        #[arg(long)]
        content: Option<String>,

        /// Read content from stdin
        #[arg(long)]
        stdin: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a tag
    Tag {
        name: String,

        /// Display color, e.g. "#ff8800"
        #[arg(long)]
        color: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
