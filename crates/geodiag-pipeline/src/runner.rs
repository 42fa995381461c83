//! Diagnostic Runner: chains the detectors and assessors over one snapshot
//!
//! CRS first, then units, origin, scale and error on top of it, the
//! validator on its own, the assessors last. Each stage output is digested
//! into the record's trace.

use crate::config::DiagnosticConfig;
use crate::record::{finite_or_undetermined, DiagnosticRecord, StageDigest};
use geodiag_core::{
    GeometryCollection, InferenceResult, MeasurementFrame, Reprojector, TransverseMercatorReprojector, GEODIAG_VERSION,
};
use geodiag_inference::{
    altimetric_error, detect_origin, detect_units, estimate_scale, planimetric_error, CrsEngine, CrsReport,
    DisplacementCheck, NoDisplacement,
};
use geodiag_quality::{assess_quality, QualityVerdict, UseCaseAssessor};
use geodiag_validation::{GeometricValidator, ValidationReport};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

/// Method tag of every result in a diagnosis of unusable input
pub const METHOD_EMPTY: &str = "empty_dataset";

pub struct DiagnosticRunner {
    config: DiagnosticConfig,
    reprojector: Box<dyn Reprojector>,
    displacement: Box<dyn DisplacementCheck>,
}

impl Default for DiagnosticRunner {
    fn default() -> Self {
        Self::new(DiagnosticConfig::default())
    }
}

impl DiagnosticRunner {
    pub fn new(config: DiagnosticConfig) -> Self {
        Self {
            config,
            reprojector: Box::new(TransverseMercatorReprojector),
            displacement: Box::new(NoDisplacement),
        }
    }

    pub fn with_reprojector(mut self, reprojector: impl Reprojector + 'static) -> Self {
        self.reprojector = Box::new(reprojector);
        self
    }

    pub fn with_displacement_check(mut self, check: impl DisplacementCheck + 'static) -> Self {
        self.displacement = Box::new(check);
        self
    }

    pub fn config(&self) -> &DiagnosticConfig {
        &self.config
    }

    pub fn diagnose(&self, collection: &GeometryCollection) -> DiagnosticRecord {
        let start = Instant::now();
        let mut trace = Trace::default();
        let input_hash = digest(collection);

        let mut record = if collection.has_usable_vertices() {
            self.detect(collection, input_hash, &mut trace)
        } else {
            empty_record(collection, input_hash)
        };

        let t = Instant::now();
        let assessor = UseCaseAssessor::new(&self.config.profiles);
        let use_cases = assessor.assess(&record.signals());
        trace.record("use_case.assess", t, &use_cases);
        record.use_cases = use_cases;
        record.stages = trace.stages;

        info!(
            tier = %record.quality.tier,
            score = record.quality.score,
            crs = ?record.crs.crs(),
            features = collection.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "diagnosis complete"
        );
        record
    }

    fn detect(&self, collection: &GeometryCollection, input_hash: String, trace: &mut Trace) -> DiagnosticRecord {
        let ctx = &self.config.context;
        let reprojector = self.reprojector.as_ref();

        let t = Instant::now();
        let crs = CrsEngine::new(&self.config.regions, reprojector)
            .with_boundary_boost(ctx.boundary_boost)
            .infer(collection);
        trace.record("crs.infer", t, &crs);
        let detected = crs.crs();

        let t = Instant::now();
        let units = detect_units(collection.extent().as_ref(), detected);
        trace.record("units.detect", t, &units);

        let t = Instant::now();
        let origin = detect_origin(collection, detected, self.displacement.as_ref());
        trace.record("origin.detect", t, &origin);

        let frame = MeasurementFrame::build(collection, reprojector);

        let t = Instant::now();
        let scale = in_frame(estimate_scale(&frame.collection), &frame);
        trace.record("scale.estimate", t, &scale);

        let t = Instant::now();
        let planimetric = finite_or_undetermined(in_frame(
            planimetric_error(&frame.collection, scale.value, ctx),
            &frame,
        ));
        let altimetric = finite_or_undetermined(altimetric_error(collection));
        trace.record("error.calculate", t, &(&planimetric, &altimetric));

        let t = Instant::now();
        let validation = GeometricValidator::new(reprojector, ctx).validate_in_frame(collection, &frame);
        trace.record("geometry.validate", t, &validation);

        let mut record = DiagnosticRecord {
            version: GEODIAG_VERSION.to_string(),
            input_hash,
            declared_crs: collection.crs.clone(),
            origin_name: origin.value.map(|o| o.datum_name().to_string()),
            crs,
            units,
            origin,
            scale,
            planimetric_error: planimetric,
            altimetric_error: altimetric,
            validation,
            quality: QualityVerdict::unassessable("not assessed yet"),
            use_cases: Vec::new(),
            stages: Vec::new(),
        };

        let t = Instant::now();
        let quality = assess_quality(&record.signals());
        trace.record("quality.assess", t, &quality);
        record.quality = quality;
        record
    }
}

/// The explicit diagnosis of input with nothing to measure.
fn empty_record(collection: &GeometryCollection, input_hash: String) -> DiagnosticRecord {
    let why = if collection.is_empty() {
        "empty collection"
    } else {
        "no geometry has usable coordinates"
    };
    debug!(features = collection.len(), reason = why, "nothing to diagnose");
    DiagnosticRecord {
        version: GEODIAG_VERSION.to_string(),
        input_hash,
        declared_crs: collection.crs.clone(),
        crs: CrsReport {
            result: InferenceResult::undetermined(0.0, METHOD_EMPTY, why),
            name: None,
            candidates: Vec::new(),
            boundary: None,
        },
        units: InferenceResult::undetermined(0.0, METHOD_EMPTY, why),
        origin: InferenceResult::undetermined(0.0, METHOD_EMPTY, why),
        origin_name: None,
        scale: InferenceResult::undetermined(0.0, METHOD_EMPTY, why),
        planimetric_error: InferenceResult::undetermined(0.0, METHOD_EMPTY, why),
        altimetric_error: InferenceResult::undetermined(0.0, METHOD_EMPTY, why),
        validation: ValidationReport::trivially_valid(collection.len()),
        quality: QualityVerdict::unassessable(why),
        use_cases: Vec::new(),
        stages: Vec::new(),
    }
}

/// Flag results measured on raw geographic coordinates.
fn in_frame<T>(mut result: InferenceResult<T>, frame: &MeasurementFrame) -> InferenceResult<T> {
    if !frame.is_metric() {
        result.rationale = format!("{}; {}", result.rationale, frame.note);
    }
    result
}

#[derive(Default)]
struct Trace {
    stages: Vec<StageDigest>,
}

impl Trace {
    fn record<T: Serialize + ?Sized>(&mut self, id: &str, started: Instant, output: &T) {
        let out_hash = digest(output);
        debug!(stage = id, latency_us = started.elapsed().as_micros() as u64, hash = %out_hash, "stage done");
        self.stages.push(StageDigest { id: id.to_string(), out_hash });
    }
}

fn hash_bytes(data: &[u8]) -> String {
    format!("blake3:{}", blake3::hash(data))
}

/// Digest of the canonical JSON of `value`.
pub fn digest<T: Serialize + ?Sized>(value: &T) -> String {
    match serde_json::to_vec(value) {
        Ok(bytes) => hash_bytes(&bytes),
        Err(e) => format!("unhashable:{}", e),
    }
}
