pub mod ast;
pub mod attributes;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod mapper;
pub mod parser;
pub mod state;
pub mod template;
pub mod tokenizer;

pub use collaborators::{Collaborators, Formatter, LineFormatter, Optimizer, PassthroughOptimizer};
pub use config::{Config, ResolvedConfig};
pub use error::SvgrError;
pub use state::{Caller, State};

/// Full SVG-to-component pipeline with the built-in collaborators.
pub fn transform(svg: &str, config: &Config, state: Option<&State>) -> Result<String, SvgrError> {
    transform_with(svg, config, state, &Collaborators::default())
}

/// Full pipeline with caller-supplied optimizer and formatter (used by WASM for JS callbacks).
pub fn transform_with(
    svg: &str,
    config: &Config,
    state: Option<&State>,
    collaborators: &Collaborators,
) -> Result<String, SvgrError> {
    let config = ResolvedConfig::resolve(config)?;
    let state = state::expand_state(state)?;
    tracing::debug!(component = %state.component_name, "Resolved configuration");

    let svg = if config.optimize {
        collaborators
            .optimizer
            .optimize(svg, config.optimizer_config.as_ref(), &state)
            .map_err(|message| SvgrError::ExternalCollaborator {
                collaborator: "optimizer".to_string(),
                message,
            })?
    } else {
        svg.to_string()
    };

    let tokens = tokenizer::tokenize(&svg)?;
    tracing::debug!(tokens = tokens.len(), "Tokenized markup");
    let markup = parser::parse(tokens)?;
    let tree = attributes::transform_tree(&markup, &config);
    let tree = mapper::map_tree(tree, &config)?;
    tracing::debug!(root = %tree.tag, "Mapped element tree");
    let code = template::render_component(&tree, &config, &state);

    if !config.format {
        return Ok(code);
    }
    match collaborators.formatter.format(&code, config.formatter_config.as_ref()) {
        Ok(formatted) => Ok(formatted),
        Err(message) => {
            tracing::warn!(%message, "Formatter failed; returning unformatted output");
            Ok(code)
        }
    }
}

/// Pipeline entry for configuration that arrives as a UTF-8 JSON payload.
pub fn transform_payload(
    svg: &str,
    payload: &[u8],
    state: Option<&State>,
    collaborators: &Collaborators,
) -> Result<String, SvgrError> {
    let config = Config::from_json_slice(payload)?;
    transform_with(svg, &config, state, collaborators)
}
