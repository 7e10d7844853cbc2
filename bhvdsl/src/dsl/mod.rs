//! The behaviour DSL
//!
//! [`BehaviourDsl`] walks a token stream and routes every `@Keyword` to its
//! handler, building a [`BehaviourDescription`] on the way. Keywords are looked
//! up in the registry of the [`DslContext`] first, then offered to the
//! selected interfaces.
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use bhvmodel::{
    BehaviourDescription, Hypothesis,
    description::BehaviourType,
    variable::{VariableCategory, VariableDescription},
};
use log::{debug, info, warn};
use smallvec::SmallVec;

use crate::{
    DslContext,
    block::{CodeBlockExtractor, standard_analyser, standard_modifier},
    config::UnknownOptionPolicy,
    error::{DslError, DslResult},
    interface::BehaviourInterface,
    options::{CodeBlockOptions, HypothesisSelection, read_code_block_options},
    token::{Cursor, Token, TokenReader, TokenStream},
};

pub mod handlers;

pub use handlers::standard_keywords;

/// Time increment, always available in code blocks.
const TIME_INCREMENT: &str = "dt";

pub struct BehaviourDsl {
    context: Arc<DslContext>,
    description: BehaviourDescription,
    interfaces: BTreeMap<String, Box<dyn BehaviourInterface>>,
    /// Gradient waiting for its thermodynamic force.
    pending_gradient: Option<VariableDescription>,
    current_keyword: String,
    file: Option<String>,
}

impl BehaviourDsl {
    pub fn new(context: Arc<DslContext>) -> DslResult<Self> {
        let mut description = BehaviourDescription::new();
        description.add_variable(
            Hypothesis::Undefined,
            VariableCategory::ExternalStateVariable,
            VariableDescription::new("temperature", "T", 1, 0).with_glossary_name(bhvmodel::glossary::TEMPERATURE),
        )?;
        description.register_member_name(Hypothesis::Undefined, TIME_INCREMENT)?;
        let mut dsl = Self {
            context,
            description,
            interfaces: BTreeMap::new(),
            pending_gradient: None,
            current_keyword: String::new(),
            file: None,
        };
        let interfaces = dsl.context.config().interfaces.clone();
        for name in &interfaces {
            dsl.select_interface(name)?;
        }
        Ok(dsl)
    }

    pub fn context(&self) -> &Arc<DslContext> {
        &self.context
    }

    pub fn description(&self) -> &BehaviourDescription {
        &self.description
    }

    pub fn description_mut(&mut self) -> &mut BehaviourDescription {
        &mut self.description
    }

    pub fn into_description(self) -> BehaviourDescription {
        self.description
    }

    /// Keyword being treated.
    pub fn current_keyword(&self) -> &str {
        &self.current_keyword
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &str> {
        self.interfaces.keys().map(String::as_str)
    }

    /// Instantiate an interface, unless already done, and reserve its names.
    pub fn select_interface(&mut self, name: &str) -> DslResult<()> {
        if self.interfaces.contains_key(name) {
            return Ok(());
        }
        let interface = self.context.interfaces().create(name)?;
        for reserved in interface.reserved_names() {
            if !self.description.default_data().is_name_reserved(&reserved) {
                self.description.reserve_name(Hypothesis::Undefined, &reserved)?;
            }
        }
        info!("Interface `{}` selected", name);
        self.interfaces.insert(name.to_string(), interface);
        Ok(())
    }

    /// Analyse a whole file and run the end of file checks.
    pub fn analyse(&mut self, stream: &TokenStream) -> DslResult<()> {
        self.file = stream.file().map(str::to_string);
        let mut reader = stream.reader();
        while let Some(token) = reader.peek() {
            reader.next()?;
            if token.is_keyword() {
                self.current_keyword = token.text.clone();
                self.dispatch(&token.text, &mut reader)
                    .map_err(|e| e.in_keyword(&token.text, token.line))?;
            } else if token.is_identifier() && reader.check(".") {
                self.treat_variable_method(token, &mut reader)
                    .map_err(|e| e.in_keyword(&token.text, token.line))?;
            } else {
                return Err(DslError::unexpected("a keyword", token));
            }
        }
        self.end_of_file()
    }

    fn dispatch(&mut self, keyword: &str, reader: &mut TokenReader<'_>) -> DslResult<()> {
        if reader.check("[") {
            let names = reader
                .read_list("[", "]")?
                .into_iter()
                .map(|t| t.text.clone())
                .collect::<Vec<_>>();
            if !names.is_empty() {
                return self.dispatch_to_interfaces(keyword, &names, reader);
            }
        }
        if let Some(handler) = self.context.keywords().get(keyword) {
            return handler(self, reader);
        }

        let names = self.interfaces.keys().cloned().collect::<Vec<_>>();
        let claims = self
            .offer_keyword(keyword, &names, *reader)?
            .into_iter()
            .filter_map(|(name, cursor)| cursor.map(|c| (name, c)))
            .collect::<SmallVec<_, 2>>();
        if claims.is_empty() {
            if self.context.config().is_ignored(keyword) {
                warn!("Line {}: ignoring keyword `{}`", reader.line(), keyword);
                return skip_keyword(reader);
            }
            return Err(DslError::UnknownKeyword {
                keyword: keyword.to_string(),
            });
        }
        reader.seek(agree_on_cursor(keyword, &claims)?);
        Ok(())
    }

    /// `@Keyword[a, b]`: every listed interface must treat the keyword.
    fn dispatch_to_interfaces(&mut self, keyword: &str, names: &[String], reader: &mut TokenReader<'_>) -> DslResult<()> {
        for name in names {
            self.select_interface(name)?;
        }
        let mut claims = SmallVec::<(String, Cursor), 2>::new();
        for (name, cursor) in self.offer_keyword(keyword, names, *reader)? {
            let cursor = cursor.ok_or_else(|| DslError::KeywordNotTreatedByInterface {
                keyword: keyword.to_string(),
                interface: name.clone(),
            })?;
            claims.push((name, cursor));
        }
        reader.seek(agree_on_cursor(keyword, &claims)?);
        Ok(())
    }

    fn offer_keyword(
        &mut self,
        keyword: &str,
        names: &[String],
        reader: TokenReader<'_>,
    ) -> DslResult<SmallVec<(String, Option<Cursor>), 2>> {
        let mut answers = SmallVec::new();
        for name in names {
            let interface = self
                .interfaces
                .get_mut(name)
                .ok_or_else(|| DslError::UnknownInterface { name: name.clone() })?;
            let cursor = interface.treat_keyword(&mut self.description, keyword, reader)?;
            if cursor.is_some() {
                debug!("Keyword `{}` treated by interface `{}`", keyword, name);
            }
            answers.push((name.clone(), cursor));
        }
        Ok(answers)
    }

    /// `variable.method(argument);` at top level.
    fn treat_variable_method(&mut self, variable: &Token, reader: &mut TokenReader<'_>) -> DslResult<()> {
        reader.expect(".")?;
        let method = reader.next()?;
        reader.expect("(")?;
        let hypotheses = self.hypotheses_defining(&variable.text)?;
        let name = variable.text.as_str();
        match method.text.as_str() {
            "setGlossaryName" => {
                let glossary_name = reader.read_string()?;
                for h in hypotheses {
                    self.description.set_glossary_name(h, name, glossary_name)?;
                }
            }
            "setEntryName" => {
                let entry_name = reader.read_string()?;
                for h in hypotheses {
                    self.description.set_entry_name(h, name, entry_name)?;
                }
            }
            "setDefaultValue" => {
                let value = reader.read_f64()?;
                for h in hypotheses {
                    self.description.set_parameter_default(h, name, vec![value])?;
                }
            }
            _ => {
                return Err(DslError::InvalidValue {
                    what: "variable method",
                    value: method.text.clone(),
                    line: method.line,
                });
            }
        }
        reader.expect(")")?;
        reader.expect(";")?;
        Ok(())
    }

    /// Hypotheses whose data declare `variable`: all of them when the default
    /// data does, the specialisations declaring it otherwise.
    pub fn hypotheses_defining(&self, variable: &str) -> DslResult<Vec<Hypothesis>> {
        if self.description.default_data().is_variable_name(variable) {
            return Ok(vec![Hypothesis::Undefined]);
        }
        let mut hypotheses = Vec::new();
        for h in self.description.specialized_hypotheses() {
            if self.description.behaviour_data(h)?.is_variable_name(variable) {
                hypotheses.push(h);
            }
        }
        if hypotheses.is_empty() {
            return Err(bhvmodel::Error::UnknownVariable {
                name: variable.to_string(),
            }
            .into());
        }
        Ok(hypotheses)
    }

    /// Read an optional `<h1, h2>` restriction, [`Hypothesis::Undefined`] if absent.
    pub fn read_hypothesis_restriction(&self, reader: &mut TokenReader<'_>) -> DslResult<Vec<Hypothesis>> {
        if !reader.check("<") {
            return Ok(vec![Hypothesis::Undefined]);
        }
        let mut hypotheses = Vec::new();
        let mut all = false;
        for token in reader.read_list("<", ">")? {
            match token.unquoted() {
                ".+" => all = true,
                name => {
                    let h = Hypothesis::parse(name)?;
                    if !hypotheses.contains(&h) {
                        hypotheses.push(h);
                    }
                }
            }
        }
        // `".+"` already covers every listed hypothesis
        if all {
            return Ok(vec![Hypothesis::Undefined]);
        }
        Ok(hypotheses)
    }

    /// Declare the supported hypotheses, narrowed by the selected interfaces.
    pub fn set_hypotheses(&mut self, hypotheses: BTreeSet<Hypothesis>) -> DslResult<()> {
        for interface in self.interfaces.values() {
            if let Some(supported) = interface.supported_hypotheses(&self.description) {
                self.description.restrict_hypotheses(supported);
            }
        }
        self.description.set_hypotheses(hypotheses, true)?;
        Ok(())
    }

    /// Read a code-block keyword: options, then the block, stored under `name`
    /// for every selected hypothesis. Members are rewritten when `rewrite`.
    pub fn treat_code_block(&mut self, reader: &mut TokenReader<'_>, name: &str, rewrite: bool) -> DslResult<()> {
        let options = read_code_block_options(reader)?;
        self.treat_unsupported_options(&options)?;
        let hypotheses = match &options.hypotheses {
            HypothesisSelection::Current | HypothesisSelection::All => vec![Hypothesis::Undefined],
            HypothesisSelection::Listed(set) => set.iter().copied().collect(),
        };
        if hypotheses.contains(&Hypothesis::Undefined)
            && !options.safe
            && self.description.specialized_hypotheses().next().is_some()
        {
            warn!(
                "Line {}: code block `{}` is also added to the specialised hypotheses",
                reader.line(),
                name
            );
        }
        let start = *reader;
        for h in hypotheses {
            let mut block_reader = start;
            let block = self.extract_code_block(&mut block_reader, h, rewrite)?;
            self.description
                .set_code(h, name, block, options.mode, options.position)?;
            *reader = block_reader;
        }
        Ok(())
    }

    fn extract_code_block(
        &self,
        reader: &mut TokenReader<'_>,
        h: Hypothesis,
        rewrite: bool,
    ) -> DslResult<bhvmodel::code::CodeBlock> {
        let data = self.description.behaviour_data(h)?;
        let mut extractor = CodeBlockExtractor::new(data, h);
        if rewrite {
            extractor = extractor
                .with_modifier(&standard_modifier, true)
                .with_analyser(&standard_analyser);
        }
        if self.context.config().debug_line_markers {
            extractor = extractor.with_line_markers(self.file.as_deref().unwrap_or("<input>"));
        }
        extractor.extract(reader)
    }

    /// Apply the configured policy to options no rule understood.
    pub fn treat_unsupported_options(&self, options: &CodeBlockOptions) -> DslResult<()> {
        for option in &options.untreated {
            match self.context.config().unknown_options {
                UnknownOptionPolicy::Error => {
                    return Err(DslError::UnsupportedOption {
                        option: option.name.clone(),
                        keyword: self.current_keyword.clone(),
                    });
                }
                UnknownOptionPolicy::Warn => warn!(
                    "Line {}: ignoring unsupported option `{}` of `{}`",
                    option.line, option.name, self.current_keyword
                ),
            }
        }
        Ok(())
    }

    fn end_of_file(&mut self) -> DslResult<()> {
        if let Some(gradient) = self.pending_gradient.take() {
            return Err(DslError::PendingGradient { name: gradient.name });
        }
        if !self.description.are_hypotheses_declared() {
            let defaults = match &self.context.config().default_hypotheses {
                Some(hypotheses) => hypotheses.clone(),
                None => default_hypotheses(self.description.behaviour_type()),
            };
            self.set_hypotheses(defaults)?;
        }
        self.description.check_consistency()?;
        info!(
            "Behaviour `{}` analysed ({} modelling hypotheses)",
            self.description.class_name().unwrap_or_default(),
            self.description.hypotheses().len()
        );
        Ok(())
    }
}

/// Hypotheses of behaviours that declare none.
fn default_hypotheses(kind: BehaviourType) -> BTreeSet<Hypothesis> {
    let mut hypotheses = Hypothesis::all_set();
    if kind.is_cohesive_zone() {
        hypotheses.remove(&Hypothesis::AxisymmetricalGeneralisedPlaneStrain);
        hypotheses.remove(&Hypothesis::AxisymmetricalGeneralisedPlaneStress);
    }
    hypotheses
}

fn agree_on_cursor(keyword: &str, claims: &[(String, Cursor)]) -> DslResult<Cursor> {
    let Some((_, first)) = claims.first() else {
        return Err(DslError::UnknownKeyword {
            keyword: keyword.to_string(),
        });
    };
    if claims.iter().any(|(_, cursor)| cursor != first) {
        return Err(DslError::AmbiguousKeyword {
            keyword: keyword.to_string(),
            interfaces: claims
                .iter()
                .map(|(name, _)| name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        });
    }
    Ok(*first)
}

/// Skip to the next keyword outside braces.
fn skip_keyword(reader: &mut TokenReader<'_>) -> DslResult<()> {
    let mut depth = 0usize;
    while let Some(token) = reader.peek() {
        if depth == 0 && token.is_keyword() {
            break;
        }
        if token.is("{") {
            depth += 1;
        } else if token.is("}") {
            depth = depth.saturating_sub(1);
        }
        reader.next()?;
    }
    Ok(())
}
