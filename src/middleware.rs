//! User middleware: explicit rule records bound to pipeline stages.
//!
//! A rule names its stage and carries a hook plus two independently
//! optional filters (scope and verb set). There is no positional
//! argument inference; a rule that compiles is unambiguous.

use crate::error::{AppError, ConfigError};
use crate::scratch::Scratch;
use crate::service::DocumentQuery;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// HTTP verbs a controller can serve, in activation order. HEAD is served
/// by axum alongside every mounted GET route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    Head,
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    pub const ALL: [Verb; 5] = [Verb::Head, Verb::Get, Verb::Post, Verb::Put, Verb::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Head => "head",
            Verb::Get => "get",
            Verb::Post => "post",
            Verb::Put => "put",
            Verb::Delete => "delete",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "head" => Ok(Verb::Head),
            "get" => Ok(Verb::Get),
            "post" => Ok(Verb::Post),
            "put" => Ok(Verb::Put),
            "delete" => Ok(Verb::Delete),
            _ => Err(ConfigError::UnknownVerb(s.to_string())),
        }
    }
}

/// A verb filter parsed from a whitespace- or comma-separated list
/// (`"GET put"`). Names are lower-cased while parsing; unknown names
/// error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerbSet(Vec<Verb>);

impl VerbSet {
    pub fn contains(&self, verb: Verb) -> bool {
        self.0.contains(&verb)
    }

    pub fn verbs(&self) -> &[Verb] {
        &self.0
    }
}

impl FromStr for VerbSet {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut verbs = Vec::new();
        for token in s.split(|c: char| c.is_whitespace() || c == ',') {
            if token.is_empty() {
                continue;
            }
            let verb = token.parse::<Verb>()?;
            if !verbs.contains(&verb) {
                verbs.push(verb);
            }
        }
        if verbs.is_empty() {
            return Err(ConfigError::EmptyVerbFilter);
        }
        Ok(VerbSet(verbs))
    }
}

impl fmt::Display for VerbSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for v in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(v.as_str())?;
            first = false;
        }
        Ok(())
    }
}

/// Pipeline stage a hook runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Before the storage query is constructed.
    Request,
    /// May rewrite the collection query (filters, limit, offset).
    Query,
    /// Transforms each outgoing document.
    Documents,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Request => "request",
            Stage::Query => "query",
            Stage::Documents => "documents",
        }
    }
}

/// Whether a hook applies to single-resource requests, collection
/// requests, or (when unset on the rule) both.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Collection,
    Instance,
}

pub type RequestHook = Arc<dyn Fn(&mut Scratch) -> Result<(), AppError> + Send + Sync>;
pub type QueryHook = Arc<dyn Fn(&mut DocumentQuery, &Scratch) -> Result<(), AppError> + Send + Sync>;
pub type DocumentHook = Arc<dyn Fn(&mut Value, &Scratch) -> Result<(), AppError> + Send + Sync>;

/// A user-supplied hook. The variant fixes which stage it can run in.
#[derive(Clone)]
pub enum Hook {
    Request(RequestHook),
    Query(QueryHook),
    Documents(DocumentHook),
}

impl Hook {
    pub fn request<F>(f: F) -> Hook
    where
        F: Fn(&mut Scratch) -> Result<(), AppError> + Send + Sync + 'static,
    {
        Hook::Request(Arc::new(f))
    }

    pub fn query<F>(f: F) -> Hook
    where
        F: Fn(&mut DocumentQuery, &Scratch) -> Result<(), AppError> + Send + Sync + 'static,
    {
        Hook::Query(Arc::new(f))
    }

    pub fn documents<F>(f: F) -> Hook
    where
        F: Fn(&mut Value, &Scratch) -> Result<(), AppError> + Send + Sync + 'static,
    {
        Hook::Documents(Arc::new(f))
    }

    pub fn stage(&self) -> Stage {
        match self {
            Hook::Request(_) => Stage::Request,
            Hook::Query(_) => Stage::Query,
            Hook::Documents(_) => Stage::Documents,
        }
    }
}

impl std::fmt::Debug for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple(match self {
            Hook::Request(_) => "Request",
            Hook::Query(_) => "Query",
            Hook::Documents(_) => "Documents",
        })
        .finish()
    }
}

/// One middleware registration: a required stage and hook, plus named,
/// independently optional scope and verb filters. Absent filters match
/// everything.
#[derive(Clone, Debug)]
pub struct MiddlewareRule {
    pub stage: Stage,
    pub scope: Option<Scope>,
    pub verbs: Option<VerbSet>,
    pub(crate) hook: Hook,
}

impl MiddlewareRule {
    pub fn new(stage: Stage, hook: Hook) -> Self {
        MiddlewareRule {
            stage,
            scope: None,
            verbs: None,
            hook,
        }
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Restrict the rule to the verbs named in `filter` (lower-cased while
    /// parsing; unknown names error).
    pub fn verbs(mut self, filter: &str) -> Result<Self, ConfigError> {
        self.verbs = Some(filter.parse()?);
        Ok(self)
    }

    /// The rule's stage must match the hook variant; checked at
    /// registration time.
    pub(crate) fn check_stage(&self) -> Result<(), ConfigError> {
        if self.stage == self.hook.stage() {
            Ok(())
        } else {
            Err(ConfigError::StageMismatch {
                stage: self.stage.name(),
                hook: self.hook.stage().name(),
            })
        }
    }

    fn applies(&self, verb: Verb, scope: Scope) -> bool {
        self.verbs.as_ref().map_or(true, |v| v.contains(verb))
            && self.scope.map_or(true, |s| s == scope)
    }
}

/// The frozen middleware pipeline. Built once when the controller
/// activates; rules run in registration order within each stage.
#[derive(Clone, Default, Debug)]
pub struct Pipeline {
    rules: Vec<MiddlewareRule>,
}

impl Pipeline {
    pub(crate) fn new(rules: Vec<MiddlewareRule>) -> Self {
        Pipeline { rules }
    }

    pub fn empty() -> Self {
        Pipeline::default()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn run_request(
        &self,
        verb: Verb,
        scope: Scope,
        scratch: &mut Scratch,
    ) -> Result<(), AppError> {
        for rule in &self.rules {
            if let Hook::Request(hook) = &rule.hook {
                if rule.applies(verb, scope) {
                    hook(scratch)?;
                }
            }
        }
        Ok(())
    }

    pub fn run_query(
        &self,
        verb: Verb,
        scope: Scope,
        query: &mut DocumentQuery,
        scratch: &Scratch,
    ) -> Result<(), AppError> {
        for rule in &self.rules {
            if let Hook::Query(hook) = &rule.hook {
                if rule.applies(verb, scope) {
                    hook(query, scratch)?;
                }
            }
        }
        Ok(())
    }

    pub fn run_documents(
        &self,
        verb: Verb,
        scope: Scope,
        document: &mut Value,
        scratch: &Scratch,
    ) -> Result<(), AppError> {
        for rule in &self.rules {
            if let Hook::Documents(hook) = &rule.hook {
                if rule.applies(verb, scope) {
                    hook(document, scratch)?;
                }
            }
        }
        Ok(())
    }
}
