use std::sync::Arc;

use log::info;
use trigram_lm_core::io::read_sentences;
use trigram_lm_core::sampling::generate;
use trigram_lm_core::scoring::score_corpus;
use trigram_lm_core::stats::CountStats;
use trigram_lm_core::{
    AddKTrigramLm, CountOrders, KneserNeyTrigramLm, LiveParams, NGramCounts, NextWordEstimator,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Corpus path can be given as the first argument
    // One whitespace-tokenised sentence per line, <s> and </s> are added if missing
    let path = std::env::args().nth(1).unwrap_or_else(|| "./data/corpus.txt".to_owned());

    // Hold out the last tenth of the sentences for evaluation
    let sentences = read_sentences(&path)?;
    let split = sentences.len() - sentences.len() / 10;
    let (train, test) = sentences.split_at(split);
    info!("{} training sentences, {} held-out sentences", train.len(), test.len());

    let train_tokens: Vec<&str> = train.iter().flatten().map(String::as_str).collect();

    // Aggregate once; each model is a view over shared counts
    let full = Arc::new(NGramCounts::build(&train_tokens, CountOrders::Full));
    println!("{}", CountStats::from_counts(&full));

    let mut kn = KneserNeyTrigramLm::from_counts(Arc::clone(&full))?;
    let mut add_k = AddKTrigramLm::from_counts(Arc::new(NGramCounts::build(
        &train_tokens,
        CountOrders::Trigram,
    )))?;

    // Hyperparameters can change without rebuilding the counts
    for k in [0.001, 0.01, 0.1, 1.0] {
        add_k.set_live_params(&LiveParams { k: Some(k), delta: None })?;
        report("add-k", &format!("k = {k}"), &add_k, test);
    }
    for delta in [0.25, 0.5, 0.75, 0.9] {
        kn.set_live_params(&LiveParams { k: None, delta: Some(delta) })?;
        report("Kneser-Ney", &format!("delta = {delta}"), &kn, test);
    }

    // Out of range values are rejected
    match kn.set_live_params(&LiveParams { k: None, delta: Some(1.5) }) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Rejected: {e}"),
    }

    let mut rng = rand::rng();
    let seed: [&str; 0] = [];
    for i in 0..5 {
        let sentence = generate(&kn, &seed, 30, &mut rng)?;
        println!("Generated sentence {}: {}", i + 1, sentence.join(" "));
    }

    Ok(())
}

/// Prints the held-out perplexity of a model, or why it cannot be computed.
fn report<E: NextWordEstimator>(name: &str, params: &str, lm: &E, test: &[Vec<String>]) {
    match score_corpus(lm, test) {
        Ok(score) => match score.perplexity() {
            Some(perplexity) => println!(
                "{name} ({params}): {} tokens, log2 P = {:.2}, perplexity = {:.2}",
                score.count, score.log2_prob, perplexity
            ),
            None => println!("{name} ({params}): nothing to score"),
        },
        Err(e) => println!("{name} ({params}): {e}"),
    }
}
