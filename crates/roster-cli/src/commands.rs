use anyhow::{Context, Result};
use roster_cli::export::{MappedSummary, map_csv, read_mappings_csv, write_mappings_csv};
use roster_cli::sample::sample_csv;
use roster_map::{
    ClassificationReport, Classifier, KnowledgeBase, KnowledgeRepository, Lexicon, RankedColumn,
};
use roster_model::{Column, Confidence, FieldKind, MappingRecord, MatchType};
use tracing::{info, info_span};

use crate::cli::{ApplyArgs, ClassifyArgs, ConfirmArgs, InputArgs, KnowledgeArgs, RankArgs};

/// Outcome of `classify`, ready for printing.
pub struct ClassifyResult {
    pub columns: Vec<Column>,
    pub report: ClassificationReport,
    pub records: Vec<MappingRecord>,
    /// Entries written to the knowledge base by this run.
    pub learned: usize,
}

pub struct ConfirmResult {
    pub field: FieldKind,
    pub column: String,
    pub added: bool,
}

pub fn run_fields() -> Vec<FieldKind> {
    FieldKind::ALL.to_vec()
}

pub fn run_classify(args: &ClassifyArgs) -> Result<ClassifyResult> {
    let span = info_span!("classify", profile = %args.knowledge.profile);
    let _guard = span.enter();

    let classifier = load_classifier(&args.input)?;
    let columns = sample_csv(&args.input.csv, args.input.sample)?;
    let (repository, mut store) = open_knowledge(&args.knowledge)?;

    let report = classifier.detect_all(&columns, &store);
    let records = report.mapping_records();

    let mut learned = 0;
    if !args.no_learn && !report.mutations.is_empty() {
        let before = store.len();
        store.apply_all(&report.mutations);
        learned = store.len() - before;
        repository
            .save(&args.knowledge.profile, &store)
            .context("save knowledge")?;
    }
    if let Some(path) = &args.export {
        write_mappings_csv(&records, path)?;
        info!(path = %path.display(), "exported mappings");
    }
    info!(
        columns = columns.len(),
        matched = report.matches.len(),
        learned,
        "classification finished"
    );

    Ok(ClassifyResult {
        columns,
        report,
        records,
        learned,
    })
}

pub fn run_rank(args: &RankArgs) -> Result<Vec<RankedColumn>> {
    let classifier = load_classifier(&args.input)?;
    let columns = sample_csv(&args.input.csv, args.input.sample)?;
    let (_, store) = open_knowledge(&args.knowledge)?;
    Ok(classifier.rank(&columns, &store))
}

/// Writes the mapped file from a mappings CSV, or from a fresh
/// classification of the input. Nothing is learned here.
pub fn run_apply(args: &ApplyArgs) -> Result<MappedSummary> {
    let records = match &args.mappings {
        Some(path) => read_mappings_csv(path)?,
        None => {
            let classifier = load_classifier(&args.input)?;
            let columns = sample_csv(&args.input.csv, args.input.sample)?;
            let (_, store) = open_knowledge(&args.knowledge)?;
            classifier.detect_all(&columns, &store).mapping_records()
        }
    };
    map_csv(&records, &args.input.csv, &args.output)
}

pub fn run_confirm(args: &ConfirmArgs) -> Result<ConfirmResult> {
    let field: FieldKind = args
        .field
        .parse()
        .with_context(|| format!("invalid --field {}", args.field))?;
    let (repository, mut store) = open_knowledge(&args.knowledge)?;

    let added = store.confirm(
        field,
        &args.column,
        Confidence::new(args.confidence),
        MatchType::ExactHeader,
    );
    if added {
        repository
            .save(&args.knowledge.profile, &store)
            .context("save knowledge")?;
    }
    Ok(ConfirmResult {
        field,
        column: args.column.clone(),
        added,
    })
}

pub fn run_knowledge(args: &KnowledgeArgs) -> Result<KnowledgeBase> {
    let (_, store) = open_knowledge(args)?;
    Ok(store)
}

fn load_classifier(input: &InputArgs) -> Result<Classifier> {
    match &input.lexicon {
        Some(path) => {
            let lexicon = Lexicon::from_path(path).context("load lexicon")?;
            Ok(Classifier::new(lexicon))
        }
        None => Ok(Classifier::default()),
    }
}

fn open_knowledge(args: &KnowledgeArgs) -> Result<(KnowledgeRepository, KnowledgeBase)> {
    let repository =
        KnowledgeRepository::new(&args.knowledge_dir).context("open knowledge repository")?;
    let store = repository
        .load_or_default(&args.profile)
        .context("load knowledge")?;
    Ok((repository, store))
}
