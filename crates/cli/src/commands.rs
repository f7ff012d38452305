use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Elaborate a parsed statement against a catalog fixture
    Elaborate {
        #[arg(long, help = "Statement file (JSON)")]
        stmt: String,

        #[arg(long, help = "Catalog fixture file (JSON)")]
        catalog: String,

        #[arg(long, help = "Session settings file (JSON); defaults apply when omitted")]
        settings: Option<String>,

        #[arg(long, help = "Original query text, kept for diagnostics")]
        query: Option<String>,

        #[arg(
            long,
            help = "If set, prints the elaboration as JSON instead of a SQL script"
        )]
        json: bool,

        #[arg(
            long,
            help = "If specified, writes the result to this file instead of stdout"
        )]
        output: Option<String>,
    },
    /// Preview how a START/END/EVERY clause splits into partitions
    Split {
        /// Partition name the generated names derive from
        #[arg(long, default_value = "p")]
        name: String,

        /// Type of the partition key: int4, numeric, date, timestamp, …
        #[arg(long, default_value = "int4")]
        key_type: String,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        #[arg(long)]
        every: Option<String>,

        #[arg(long, help = "If set, prints the partitions as JSON instead of a table")]
        json: bool,
    },
}
