use clap::{Parser, ValueEnum};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use svgr_core::config::{Config, ExpandProps, ExportType, Icon, JsxRuntime};
use svgr_core::state::component_name_from_path;
use svgr_core::State;

#[derive(Parser)]
#[command(name = "svgr", about = "Transform SVG files into React components")]
struct Cli {
    /// Input SVG file(s) or directory. Omit to read from stdin.
    #[arg()]
    input: Vec<PathBuf>,

    /// Output file (single input only) or directory (multiple inputs).
    /// Omit to write to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to a config file (.toml or .json).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File extension for output files in directory mode (default: "js", or "tsx" with --typescript).
    #[arg(long)]
    ext: Option<String>,

    /// Also write an index file re-exporting every component (directory mode).
    #[arg(long)]
    index: bool,

    /// Uniform width/height: bare `--icon` means "1em", `--icon=24` or `--icon=2em` sets the size.
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    icon: Option<String>,

    /// Target react-native-svg.
    #[arg(long)]
    native: bool,

    /// Forward a ref to the root <svg>.
    #[arg(long = "ref")]
    forward_ref: bool,

    /// Add a `title` prop rendered as <title>.
    #[arg(long)]
    title_prop: bool,

    /// Add a `desc` prop rendered as <desc>.
    #[arg(long)]
    desc_prop: bool,

    /// Where to spread props on the root element.
    #[arg(long, value_enum)]
    expand_props: Option<SpreadArg>,

    /// Remove width/height from the root element.
    #[arg(long)]
    no_dimensions: bool,

    /// Wrap the component in memo().
    #[arg(long)]
    memo: bool,

    /// Emit TypeScript.
    #[arg(long)]
    typescript: bool,

    #[arg(long, value_enum)]
    export_type: Option<ExportArg>,

    /// Identifier for the named export.
    #[arg(long)]
    named_export: Option<String>,

    #[arg(long, value_enum)]
    jsx_runtime: Option<RuntimeArg>,

    /// Replace an attribute value, e.g. `--replace-attr-values '#000=currentColor'`. Repeatable.
    #[arg(long, value_parser = parse_key_value)]
    replace_attr_values: Vec<(String, String)>,

    /// Add or override a root prop, e.g. `--svg-props role=img`. Repeatable.
    #[arg(long, value_parser = parse_key_value)]
    svg_props: Vec<(String, String)>,

    /// Skip the optimizer.
    #[arg(long)]
    no_svgo: bool,

    /// Skip the formatter.
    #[arg(long)]
    no_prettier: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum SpreadArg {
    Start,
    End,
    None,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportArg {
    Default,
    Named,
}

#[derive(Clone, Copy, ValueEnum)]
enum RuntimeArg {
    Classic,
    ClassicPreact,
    Automatic,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path),
        None => Config::default(),
    };
    apply_overrides(&mut config, &cli);
    tracing::debug!(?config, "Effective configuration");

    if cli.input.is_empty() {
        // Stdin mode
        let mut input = String::new();
        io::stdin().read_to_string(&mut input).unwrap_or_else(|e| {
            eprintln!("Error reading stdin: {e}");
            std::process::exit(1);
        });
        let result = transform_or_exit(&input, &config, None, "<stdin>");
        write_output(&result, cli.output.as_deref());
        return;
    }

    let files = collect_svg_files(&cli.input);
    if files.is_empty() {
        eprintln!("No .svg files found");
        std::process::exit(1);
    }

    if files.len() == 1 && !cli.index {
        let input = read_file(&files[0]);
        let result = transform_or_exit(&input, &config, Some(&files[0]), &files[0].display().to_string());
        write_output(&result, cli.output.as_deref());
        return;
    }

    let out_dir = cli.output.clone().unwrap_or_else(|| {
        eprintln!("Multiple input files or --index require --output directory");
        std::process::exit(1);
    });
    std::fs::create_dir_all(&out_dir).unwrap_or_else(|e| {
        eprintln!("Error creating output directory: {e}");
        std::process::exit(1);
    });

    let ext = cli
        .ext
        .clone()
        .unwrap_or_else(|| if config.typescript { "tsx" } else { "js" }.to_string());
    let mut components = Vec::new();
    for file in &files {
        let input = read_file(file);
        let result = transform_or_exit(&input, &config, Some(file), &file.display().to_string());
        let name = component_name_from_path(&file.to_string_lossy());
        let out_path = out_dir.join(format!("{name}.{ext}"));
        write_file(&out_path, &result);
        eprintln!("{} -> {}", file.display(), out_path.display());
        components.push(name);
    }

    if cli.index {
        let index_ext = if config.typescript { "ts" } else { "js" };
        let out_path = out_dir.join(format!("index.{index_ext}"));
        write_file(&out_path, &index_file(&components, &config));
        eprintln!("index -> {}", out_path.display());
    }
}

fn load_config(path: &Path) -> Config {
    let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading config {}: {e}", path.display());
        std::process::exit(1);
    });
    let parsed = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        Config::from_json_slice(text.as_bytes()).map_err(|e| e.to_string())
    } else {
        Config::from_toml(&text).map_err(|e| e.to_string())
    };
    let mut config = parsed.unwrap_or_else(|e| {
        eprintln!("Error parsing config: {e}");
        std::process::exit(1);
    });
    config.config_file = Some(path.display().to_string());
    config
}

/// Flags win over the config file; unset flags leave it alone.
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(icon) = &cli.icon {
        config.icon = Some(parse_icon(icon));
    }
    config.native |= cli.native;
    config.r#ref |= cli.forward_ref;
    config.title_prop |= cli.title_prop;
    config.desc_prop |= cli.desc_prop;
    config.memo |= cli.memo;
    config.typescript |= cli.typescript;
    if cli.no_dimensions {
        config.dimensions = false;
    }
    if cli.no_svgo {
        config.svgo = false;
    }
    if cli.no_prettier {
        config.prettier = false;
    }
    if let Some(spread) = cli.expand_props {
        config.expand_props = match spread {
            SpreadArg::Start => ExpandProps::Start,
            SpreadArg::End => ExpandProps::End,
            SpreadArg::None => ExpandProps::None,
        };
    }
    if let Some(export) = cli.export_type {
        config.export_type = Some(match export {
            ExportArg::Default => ExportType::Default,
            ExportArg::Named => ExportType::Named,
        });
    }
    if let Some(name) = &cli.named_export {
        config.named_export = Some(name.clone());
    }
    if let Some(runtime) = cli.jsx_runtime {
        config.jsx_runtime = Some(match runtime {
            RuntimeArg::Classic => JsxRuntime::Classic,
            RuntimeArg::ClassicPreact => JsxRuntime::ClassicPreact,
            RuntimeArg::Automatic => JsxRuntime::Automatic,
        });
    }
    for (from, to) in &cli.replace_attr_values {
        config.replace_attr_values.insert(from.clone(), to.clone());
    }
    for (name, value) in &cli.svg_props {
        config.svg_props.insert(name.clone(), value.clone());
    }
}

fn parse_icon(value: &str) -> Icon {
    match value {
        "true" => Icon::Bool(true),
        "false" => Icon::Bool(false),
        _ => match value.parse::<f64>() {
            Ok(n) => Icon::Number(n),
            Err(_) => Icon::String(value.to_string()),
        },
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {s:?}")),
    }
}

fn index_file(components: &[String], config: &Config) -> String {
    let named = config.export_type == Some(ExportType::Named)
        || (config.export_type.is_none() && config.named_export.is_some());
    let exported = if named {
        config.named_export.as_deref().unwrap_or("ReactComponent")
    } else {
        "default"
    };
    components
        .iter()
        .map(|name| format!("export {{ {exported} as {name} }} from \"./{name}\";\n"))
        .collect()
}

fn transform_or_exit(input: &str, config: &Config, file: Option<&Path>, source: &str) -> String {
    let state = file.map(|path| State {
        file_path: Some(path.to_string_lossy().into_owned()),
        ..Default::default()
    });
    svgr_core::transform(input, config, state.as_ref()).unwrap_or_else(|e| {
        eprintln!("Error transforming {source}: {e}");
        std::process::exit(1);
    })
}

fn read_file(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", path.display());
        std::process::exit(1);
    })
}

fn write_file(path: &Path, content: &str) {
    std::fs::write(path, content).unwrap_or_else(|e| {
        eprintln!("Error writing {}: {e}", path.display());
        std::process::exit(1);
    });
}

fn write_output(content: &str, output: Option<&Path>) {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).ok();
            }
            write_file(path, content);
        }
        None => {
            io::stdout().write_all(content.as_bytes()).unwrap_or_else(|e| {
                eprintln!("Error writing stdout: {e}");
                std::process::exit(1);
            });
        }
    }
}

fn collect_svg_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            if let Ok(entries) = std::fs::read_dir(input) {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.extension().and_then(|e| e.to_str()) == Some("svg") {
                        files.push(path);
                    }
                }
            }
        } else {
            files.push(input.clone());
        }
    }
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("svgr").chain(args.iter().copied()))
    }

    #[test]
    fn test_icon_flag_forms() {
        assert_eq!(cli(&["--icon"]).icon.as_deref(), Some("true"));
        assert_eq!(cli(&["--icon=24"]).icon.as_deref(), Some("24"));
        assert_eq!(parse_icon("true"), Icon::Bool(true));
        assert_eq!(parse_icon("24"), Icon::Number(24.0));
        assert_eq!(parse_icon("2em"), Icon::String("2em".to_string()));
    }

    #[test]
    fn test_icon_flag_leaves_input_alone() {
        let args = cli(&["--icon", "logo.svg"]);
        assert_eq!(args.icon.as_deref(), Some("true"));
        assert_eq!(args.input, vec![PathBuf::from("logo.svg")]);
    }

    #[test]
    fn test_overrides_apply_on_top_of_config() {
        let args = cli(&[
            "--ref",
            "--no-dimensions",
            "--expand-props",
            "start",
            "--jsx-runtime",
            "classic-preact",
            "--svg-props",
            "role=img",
            "--replace-attr-values",
            "#000=currentColor",
        ]);
        let mut config = Config {
            memo: true,
            ..Default::default()
        };
        apply_overrides(&mut config, &args);
        assert!(config.r#ref);
        assert!(config.memo);
        assert!(!config.dimensions);
        assert_eq!(config.expand_props, ExpandProps::Start);
        assert_eq!(config.jsx_runtime, Some(JsxRuntime::ClassicPreact));
        assert_eq!(config.svg_props.get("role").map(String::as_str), Some("img"));
        assert_eq!(
            config.replace_attr_values.get("#000").map(String::as_str),
            Some("currentColor")
        );
    }

    #[test]
    fn test_key_value_parser() {
        assert_eq!(parse_key_value("a=b=c"), Ok(("a".to_string(), "b=c".to_string())));
        assert!(parse_key_value("=x").is_err());
        assert!(parse_key_value("novalue").is_err());
    }

    #[test]
    fn test_index_file() {
        let components = vec!["SvgArrow".to_string(), "SvgStar".to_string()];
        assert_eq!(
            index_file(&components, &Config::default()),
            "export { default as SvgArrow } from \"./SvgArrow\";\nexport { default as SvgStar } from \"./SvgStar\";\n"
        );
        let config = Config {
            named_export: Some("Icon".to_string()),
            ..Default::default()
        };
        assert_eq!(
            index_file(&components[..1], &config),
            "export { Icon as SvgArrow } from \"./SvgArrow\";\n"
        );
    }
}
