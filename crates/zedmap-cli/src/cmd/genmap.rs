use anyhow::{Context, Result};
use zedmap_core::codec::{self, OutputFormat};
use zedmap_core::compiler::ZedCompiler;
use zedmap_core::config::CoreConfig;
use zedmap_core::pipeline::parse_schema;

use crate::args::GenmapArgs;
use crate::io::{export, input};
use crate::output;

pub fn run(args: &GenmapArgs) -> Result<()> {
    let dest = export::destination(&args.output);
    let format = OutputFormat::select(args.format.as_deref(), dest)?;

    let mut config = CoreConfig::default();
    config.resolver.mode = args.resolution.into();
    config.resolver.tupleset = args.tupleset.into();

    let raw = input::read_schema(&args.schema)?;
    let source_name = args.schema.display().to_string();
    let schema = parse_schema(&source_name, &raw, &ZedCompiler, &config)
        .with_context(|| format!("error compiling schema [{source_name}]"))?;

    tracing::info!(
        entities = schema.entities.len(),
        warnings = schema.warnings.len(),
        hash = %schema.schema_hash,
        "built relation map"
    );

    let text = codec::encode(&schema, format)?;
    export::write_output(dest, &text)?;

    if let Some(path) = dest {
        tracing::info!(path = %path.display(), format = %format, "wrote relation map");
    }

    // Only reported once the map has been written.
    if !args.quiet {
        output::print_warnings(&schema.warnings)?;
    }
    Ok(())
}
