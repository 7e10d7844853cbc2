//! Front end of the behaviour compiler.
//!
//! Turns behaviour files into [`BehaviourDescription`]s: the [`lexer`] produces
//! [`token`]s, and [`dsl::BehaviourDsl`] dispatches every `@Keyword` to the
//! handlers of a [`keywords::KeywordRegistry`] or to the selected
//! [`interface`]s.
use std::{path::Path, sync::Arc};

use bhvmodel::BehaviourDescription;

pub mod block;
pub mod config;
pub mod dsl;
pub mod error;
pub mod interface;
pub mod keywords;
pub mod lexer;
pub mod options;
pub mod token;

pub use config::DslConfig;
pub use dsl::BehaviourDsl;
pub use error::{DslError, DslResult};
use interface::InterfaceFactory;
use keywords::KeywordRegistry;
use token::TokenStream;

/// Everything a compilation needs besides its input. Built once, then shared.
#[derive(Debug)]
pub struct DslContext {
    keywords: KeywordRegistry,
    interfaces: InterfaceFactory,
    config: DslConfig,
}

impl DslContext {
    pub fn new(keywords: KeywordRegistry, interfaces: InterfaceFactory, config: DslConfig) -> Arc<Self> {
        Arc::new(Self {
            keywords,
            interfaces,
            config,
        })
    }

    /// Standard keywords and interfaces.
    pub fn standard(config: DslConfig) -> DslResult<Arc<Self>> {
        Ok(Self::new(dsl::standard_keywords()?, InterfaceFactory::standard(), config))
    }

    pub fn keywords(&self) -> &KeywordRegistry {
        &self.keywords
    }

    pub fn interfaces(&self) -> &InterfaceFactory {
        &self.interfaces
    }

    pub fn config(&self) -> &DslConfig {
        &self.config
    }
}

pub fn compile(context: &Arc<DslContext>, stream: &TokenStream) -> DslResult<BehaviourDescription> {
    let mut dsl = BehaviourDsl::new(Arc::clone(context))?;
    dsl.analyse(stream)?;
    Ok(dsl.into_description())
}

pub fn compile_str(context: &Arc<DslContext>, src: &str, file: Option<&str>) -> DslResult<BehaviourDescription> {
    compile(context, &TokenStream::lex(src, file)?)
}

pub fn compile_path(context: &Arc<DslContext>, path: &Path) -> DslResult<BehaviourDescription> {
    compile(context, &TokenStream::from_path(path)?)
}
