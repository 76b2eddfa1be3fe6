use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};

use log::info;
use serde::{Deserialize, Serialize};
use trigram_lm_core::io::list_files;
use trigram_lm_core::sampling::predict_next;
use trigram_lm_core::scoring::score_seq;
use trigram_lm_core::stats::CountStats;
use trigram_lm_core::{
	AddKTrigramLm, CountOrders, KneserNeyTrigramLm, LanguageModel, LiveParams, LmError, ModelKind,
	NGramCounts, NextWordEstimator,
};

const DATA_FOLDER: &str = "./data";

/// Query parameters for the `/v1/proba` endpoint
#[derive(Deserialize)]
struct ProbaParams {
	model: Option<ModelKind>,
	word: String,
	context: Option<String> // space separated, oldest first
}

/// Query parameters for the `/v1/score` and `/v1/sample` endpoints
#[derive(Deserialize)]
struct SequenceParams {
	model: Option<ModelKind>,
	seq: Option<String> // space separated
}

#[derive(Deserialize)]
struct ModelQuery {
	name: Option<String>
}

#[derive(Serialize)]
struct ScoreResponse {
	log2_prob: f64,
	count: usize,
	perplexity: Option<f64>
}

/// Models built from the currently loaded corpus, one per smoothing method.
#[derive(Default)]
struct SharedData {
	corpus: Option<String>,
	models: HashMap<ModelKind, LanguageModel>,
	stats: Option<CountStats>
}

impl SharedData {
	fn model(&self, kind: Option<ModelKind>) -> Result<&LanguageModel, HttpResponse> {
		self.models
			.get(&kind.unwrap_or(ModelKind::KneserNey))
			.ok_or_else(|| HttpResponse::BadRequest().body("No model loaded"))
	}
}

/// Splits a space separated query value into words.
fn split_words(value: &Option<String>) -> Vec<&str> {
	value
		.as_deref()
		.map(|s| s.split_whitespace().collect())
		.unwrap_or_default()
}

/// Maps a model error to a response.
fn error_response(e: LmError) -> HttpResponse {
	match e {
		LmError::InvalidHyperparameter { .. } => HttpResponse::BadRequest().body(e.to_string()),
		LmError::Io(_) | LmError::Codec(_) => HttpResponse::InternalServerError().body(e.to_string()),
		_ => HttpResponse::UnprocessableEntity().body(e.to_string()),
	}
}

/// HTTP GET endpoint `/v1/proba`
///
/// Returns `P(word | context)` under the selected model.
#[get("/v1/proba")]
async fn get_proba(data: web::Data<RwLock<SharedData>>, query: web::Query<ProbaParams>) -> impl Responder {
	let shared_data = match data.read() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let lm = match shared_data.model(query.model) {
		Ok(lm) => lm,
		Err(response) => return response,
	};

	match lm.next_word_proba(&query.word, &split_words(&query.context)) {
		Ok(p) => HttpResponse::Ok().body(p.to_string()),
		Err(e) => error_response(e),
	}
}

/// HTTP GET endpoint `/v1/score`
///
/// Scores a sequence, boundary markers excluded.
#[get("/v1/score")]
async fn get_score(data: web::Data<RwLock<SharedData>>, query: web::Query<SequenceParams>) -> impl Responder {
	let shared_data = match data.read() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let lm = match shared_data.model(query.model) {
		Ok(lm) => lm,
		Err(response) => return response,
	};

	match score_seq(lm, &split_words(&query.seq)) {
		Ok(score) => HttpResponse::Ok().json(ScoreResponse {
			log2_prob: score.log2_prob,
			count: score.count,
			perplexity: score.perplexity(),
		}),
		Err(e) => error_response(e),
	}
}

/// HTTP GET endpoint `/v1/sample`
///
/// Draws one next word after the given sequence.
#[get("/v1/sample")]
async fn get_sample(data: web::Data<RwLock<SharedData>>, query: web::Query<SequenceParams>) -> impl Responder {
	let shared_data = match data.read() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let lm = match shared_data.model(query.model) {
		Ok(lm) => lm,
		Err(response) => return response,
	};

	match predict_next(lm, &split_words(&query.seq), &mut rand::rng()) {
		Ok(word) => HttpResponse::Ok().body(word),
		Err(e) => error_response(e),
	}
}

/// HTTP PUT endpoint `/v1/params`
///
/// Updates `k` and/or `delta` without rebuilding the counts.
/// Every value is validated before any model is touched.
#[put("/v1/params")]
async fn put_params(data: web::Data<RwLock<SharedData>>, query: web::Query<LiveParams>) -> impl Responder {
	if let Err(e) = query.validate() {
		return error_response(e);
	}

	let mut shared_data = match data.write() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	for lm in shared_data.models.values_mut() {
		if let Err(e) = lm.set_live_params(&query) {
			return error_response(e);
		}
	}

	HttpResponse::Ok().body("Parameters updated")
}

#[get("/v1/models")]
async fn get_models() -> impl Responder {
	match list_files(DATA_FOLDER, "txt") {
		Ok(files) => HttpResponse::Ok().body(files.join("\n").replace(".txt", "")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list corpora")
	}
}

#[get("/v1/stats")]
async fn get_stats(data: web::Data<RwLock<SharedData>>) -> impl Responder {
	let shared_data = match data.read() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match (&shared_data.corpus, &shared_data.stats) {
		(Some(corpus), Some(stats)) => HttpResponse::Ok().body(format!("{corpus}\n{stats}")),
		_ => HttpResponse::BadRequest().body("No model loaded"),
	}
}

/// Builds both served models over one corpus, with the diagnostics of the
/// full tables. Blocking: reads the corpus or its binary caches.
fn build_models(corpus_path: &str) -> Result<(HashMap<ModelKind, LanguageModel>, CountStats), LmError> {
	let full = Arc::new(NGramCounts::from_corpus_file(corpus_path, CountOrders::Full)?);
	let trigram = Arc::new(NGramCounts::from_corpus_file(corpus_path, CountOrders::Trigram)?);

	let mut models = HashMap::new();
	models.insert(ModelKind::AddK, LanguageModel::from(AddKTrigramLm::from_counts(trigram)?));
	models.insert(ModelKind::KneserNey, LanguageModel::from(KneserNeyTrigramLm::from_counts(Arc::clone(&full))?));

	Ok((models, CountStats::from_counts(&full)))
}

/// HTTP PUT endpoint `/v1/load_model`
///
/// Aggregates `./data/<name>.txt` (or its binary cache) and replaces the
/// served models. Aggregation runs on the blocking thread pool, outside of
/// the lock.
#[put("/v1/load_model")]
async fn put_model(data: web::Data<RwLock<SharedData>>, query: web::Query<ModelQuery>) -> impl Responder {
	let name = match &query.name {
		Some(s) if !s.trim().is_empty() => s.trim().to_owned(),
		_ => return HttpResponse::BadRequest().body("Missing or empty model name"),
	};

	let corpus_path = format!("{DATA_FOLDER}/{name}.txt");
	let built = {
		let corpus_path = corpus_path.clone();
		web::block(move || build_models(&corpus_path)).await
	};
	let (models, stats) = match built {
		Ok(Ok(built)) => built,
		Ok(Err(e)) => return HttpResponse::InternalServerError().body(format!("Failed to load model: {e}")),
		Err(e) => return HttpResponse::InternalServerError().body(format!("Failed to load model: {e}"))
	};

	let mut shared_data = match data.write() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	shared_data.stats = Some(stats);
	shared_data.models = models;
	shared_data.corpus = Some(name);
	info!("Serving models built from {}", corpus_path);

	HttpResponse::Ok().body("Model loaded successfully")
}

/// Main entry point for the server.
///
/// Holds the models behind a `RwLock`: queries share read access, while
/// hyperparameter updates and model loading take the write lock.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - Corpora are read from `./data/<name>.txt`.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let shared_model = web::Data::new(RwLock::new(SharedData::default()));

	HttpServer::new(move || {
		App::new()
			.app_data(shared_model.clone())
			.service(get_proba)
			.service(get_score)
			.service(get_sample)
			.service(put_params)
			.service(get_models)
			.service(get_stats)
			.service(put_model)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}
