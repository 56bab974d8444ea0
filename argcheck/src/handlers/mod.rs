//! The handler pipeline: a closed set of checks, each appending results to a request.

pub mod arganno;
pub mod argmap;
pub mod content;
pub mod infreco;
pub mod logreco;

use crate::{
    coherence::CoherenceCheck,
    config::VerifierConfig,
    processing::{argdown::ArgdownGraph, xml::Element, ProcessingStep},
    request::{
        Artifact, DataFilter, DataType, ResultDetails, VerificationData, VerificationRequest,
        VerificationResult,
    },
    ArgcheckResult, Error,
};
use arganno::ArgannoCheck;
use argmap::ArgmapCheck;
use content::ContentCheck;
use infreco::InfrecoCheck;
use logreco::LogrecoCheck;
use std::sync::Arc;

/// What a check reports about the data it evaluated. An empty message list means it passed.
#[derive(Debug, Default)]
pub struct Report {
    pub messages: Vec<String>,
    pub details: Option<ResultDetails>,
    pub artifacts: Vec<(String, Artifact)>,
}

impl Report {
    pub fn new(messages: Vec<String>) -> Self {
        Report { messages, ..Default::default() }
    }

    pub fn pass() -> Self {
        Self::default()
    }

    pub fn fail(message: String) -> Self {
        Self::new(vec![message])
    }

    pub fn with_details(mut self, details: ResultDetails) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_artifact(mut self, key: &str, artifact: Artifact) -> Self {
        self.artifacts.push((key.to_owned(), artifact));
        self
    }
}

/// What a check can see while it evaluates.
pub struct Context<'a> {
    pub request: &'a VerificationRequest,
    pub config: &'a VerifierConfig,

    /// The verifier id of the running check.
    pub name: &'a str,
}

impl Context<'_> {
    pub fn graph<'d>(&self, data: &'d VerificationData) -> ArgcheckResult<&'d ArgdownGraph> {
        data.argdown().map(Arc::as_ref).ok_or_else(|| Error::WrongPayload {
            handler: self.name.to_owned(),
            expected: "argdown",
        })
    }

    pub fn annotation<'d>(&self, data: &'d VerificationData) -> ArgcheckResult<&'d Element> {
        data.xml().map(Arc::as_ref).ok_or_else(|| Error::WrongPayload {
            handler: self.name.to_owned(),
            expected: "xml",
        })
    }
}

/// A check over a single artifact.
pub trait StructuralCheck {
    /// The suite prefix of verifier ids, e.g. `InfReco`.
    const SUITE: &'static str;

    /// The type of data the check evaluates.
    const DTYPE: DataType;

    fn name(&self) -> &'static str;

    /// The separator used when the messages of one report are joined.
    fn separator(&self) -> &'static str {
        " "
    }

    /// Evaluates one parsed data item. Returns `None` when the check does not apply to it.
    fn evaluate(&self, data: &VerificationData, ctx: &Context) -> ArgcheckResult<Option<Report>>;
}

/// A configured check: its kind plus the verifier id and data filter it runs with.
#[derive(Debug, Clone)]
pub struct Check<K> {
    pub name: String,
    pub filter: DataFilter,
    pub kind: K,
    config: Arc<VerifierConfig>,
}

impl<K: StructuralCheck> Check<K> {
    pub fn new(kind: K, filter: DataFilter, config: Arc<VerifierConfig>) -> Self {
        let name = format!("{}.{}Handler", K::SUITE, kind.name());
        Check { name, filter, kind, config }
    }

    fn run(
        &self,
        request: &VerificationRequest,
    ) -> Option<(VerificationResult, Vec<(String, Artifact)>)> {
        let Some(data) = request.last_attempt(K::DTYPE, &self.filter) else {
            log::debug!("{}: no {} data to verify", self.name, K::DTYPE);
            return None;
        };
        if !data.is_parsed() {
            log::debug!("{}: skipping {}, which could not be parsed", self.name, data.id);
            return None;
        }
        let ctx = Context { request, config: &self.config, name: &self.name };
        match self.kind.evaluate(data, &ctx) {
            Ok(report) => {
                let report = report?;
                let mut result = VerificationResult::from_messages(
                    &self.name,
                    vec![data.id.clone()],
                    report.messages,
                    self.kind.separator(),
                );
                result.details = report.details;
                Some((result, report.artifacts))
            }
            Err(e) => Some((processing_error(&self.name, e), Vec::new())),
        }
    }
}

impl Check<ContentCheck> {
    pub fn content(kind: ContentCheck, filter: DataFilter, config: Arc<VerifierConfig>) -> Self {
        Check { name: kind.name().to_owned(), filter, kind, config }
    }
}

pub(crate) fn processing_error(name: &str, e: Error) -> VerificationResult {
    log::error!("error in processing handler {}: {}", name, e);
    VerificationResult::fail(name, Vec::new(), format!("Processing error: {}", e))
}

/// A stage of a verification pipeline.
#[derive(Debug, Clone)]
pub enum Handler {
    /// Runs its children in order, feeding each the request returned by the previous one.
    Composite {
        name: String,
        children: Vec<Handler>,
    },
    Processing(ProcessingStep),
    Content(Check<ContentCheck>),
    Arganno(Check<ArgannoCheck>),
    Argmap(Check<ArgmapCheck>),
    Infreco(Check<InfrecoCheck>),
    Logreco(Check<LogrecoCheck>),
    Coherence(CoherenceCheck),
}

impl Handler {
    pub fn name(&self) -> &str {
        match self {
            Handler::Composite { name, .. } => name,
            Handler::Processing(step) => step.name(),
            Handler::Content(c) => &c.name,
            Handler::Arganno(c) => &c.name,
            Handler::Argmap(c) => &c.name,
            Handler::Infreco(c) => &c.name,
            Handler::Logreco(c) => &c.name,
            Handler::Coherence(c) => &c.name,
        }
    }

    pub fn composite(name: &str, children: Vec<Handler>) -> Self {
        Handler::Composite { name: name.to_owned(), children }
    }

    /// All leaf handlers, in execution order.
    pub fn leaves(&self) -> Vec<&Handler> {
        match self {
            Handler::Composite { children, .. } => {
                children.iter().flat_map(Handler::leaves).collect()
            }
            other => vec![other],
        }
    }

    pub fn process(&self, mut request: VerificationRequest) -> VerificationRequest {
        log::debug!("executing handler: {}", self.name());
        request.record_handler(self.name());

        let outcome = match self {
            Handler::Composite { children, .. } => {
                return children.iter().fold(request, |request, child| child.process(request));
            }
            Handler::Processing(step) => return step.apply(request),
            Handler::Content(check) => Some((check.kind.evaluate(check, &request), Vec::new())),
            Handler::Arganno(check) => check.run(&request),
            Handler::Argmap(check) => check.run(&request),
            Handler::Infreco(check) => check.run(&request),
            Handler::Logreco(check) => check.run(&request),
            Handler::Coherence(check) => check.run(&request),
        };
        if let Some((result, artifacts)) = outcome {
            request.add_result(result);
            for (key, artifact) in artifacts {
                request.add_artifact(key, artifact);
            }
        }
        request
    }

    /// Extracts every fenced block and parses it.
    pub fn processing() -> Self {
        Handler::composite(
            "DefaultProcessingHandler",
            vec![
                Handler::Processing(ProcessingStep::Extract {
                    languages: vec![DataType::Argdown, DataType::Xml],
                }),
                Handler::Processing(ProcessingStep::ParseArgdown),
                Handler::Processing(ProcessingStep::ParseXml),
            ],
        )
    }

    pub fn has_annotations(config: &Arc<VerifierConfig>, filter: DataFilter) -> Self {
        Handler::Content(Check::content(ContentCheck::HasAnnotations, filter, config.clone()))
    }

    pub fn has_argdown(config: &Arc<VerifierConfig>, filter: DataFilter) -> Self {
        Handler::Content(Check::content(ContentCheck::HasArgdown, filter, config.clone()))
    }

    /// An argdown content check for one of several blocks, reported as `HasArgdownHandler.{role}`.
    pub fn has_argdown_as(config: &Arc<VerifierConfig>, role: &str, filter: DataFilter) -> Self {
        let mut check = Check::content(ContentCheck::HasArgdown, filter, config.clone());
        check.name = format!("{}.{}", check.name, role);
        Handler::Content(check)
    }

    pub fn arganno(config: &Arc<VerifierConfig>, filter: DataFilter) -> Self {
        let children = ArgannoCheck::default_suite(config)
            .into_iter()
            .map(|kind| Handler::Arganno(Check::new(kind, filter.clone(), config.clone())))
            .collect();
        Handler::composite("Arganno.CompositeHandler", children)
    }

    pub fn argmap(config: &Arc<VerifierConfig>, filter: DataFilter) -> Self {
        let children = ArgmapCheck::ALL
            .into_iter()
            .map(|kind| Handler::Argmap(Check::new(kind, filter.clone(), config.clone())))
            .collect();
        Handler::composite("ArgMap.CompositeHandler", children)
    }

    /// The informal reconstruction checks in `kinds`, in the given order.
    pub fn infreco_with(
        config: &Arc<VerifierConfig>,
        filter: DataFilter,
        kinds: &[InfrecoCheck],
    ) -> Self {
        let children = kinds
            .iter()
            .map(|&kind| Handler::Infreco(Check::new(kind, filter.clone(), config.clone())))
            .collect();
        Handler::composite("InfReco.CompositeHandler", children)
    }

    pub fn infreco(config: &Arc<VerifierConfig>, filter: DataFilter) -> Self {
        Self::infreco_with(config, filter, &InfrecoCheck::INFORMAL_SUITE)
    }

    pub fn logreco(config: &Arc<VerifierConfig>, filter: DataFilter) -> Self {
        let children = LogrecoCheck::ALL
            .into_iter()
            .map(|kind| Handler::Logreco(Check::new(kind, filter.clone(), config.clone())))
            .collect();
        Handler::composite("LogReco.CompositeHandler", children)
    }
}
