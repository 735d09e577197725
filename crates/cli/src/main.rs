use anyhow::{Context, Result, anyhow};
use chatbot::TourismChatbot;
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{DestinationId, TravelIndex, UserId};
use engine::{HybridRecommender, Recommendation};
use evaluation::{ComparisonRow, EvalOptions};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use recommenders::{
    CollaborativeFilteringRecommender, ContentBasedRecommender, NeuralCfRecommender, Recommender,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use sustainability::{Counterfactual, RecommendationExplainer, SustainabilityProfile};

/// EcoTrek - Sustainability-aware travel recommendations
#[derive(Parser)]
#[command(name = "eco-trek")]
#[command(about = "Sustainable tourism recommender", long_about = None)]
struct Cli {
    /// Path to the catalog directory (users.json, destinations.json, activities.json)
    #[arg(short, long, default_value = "data/processed")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get destination recommendations for a user
    Recommend {
        /// User ID to recommend for
        #[arg(long)]
        user_id: UserId,

        /// Number of recommendations to return
        #[arg(long, default_value = "5")]
        limit: usize,

        /// Sustainability weight in [0, 1]: 0 = pure relevance, 1 = pure eco
        #[arg(long, default_value = "0.3")]
        weight: f32,

        /// Also rank destinations the user has already visited
        #[arg(long)]
        include_visited: bool,

        /// Show the sustainability rationale for each recommendation
        #[arg(long)]
        explain: bool,
    },

    /// Show the sustainability profile of a destination
    Explain {
        /// Destination ID to explain
        #[arg(long)]
        destination_id: DestinationId,
    },

    /// Find a comparable, more sustainable alternative to a destination
    Counterfactual {
        /// Destination ID to find an alternative for
        #[arg(long)]
        destination_id: DestinationId,
    },

    /// Run offline evaluation of the hybrid recommender
    Evaluate {
        /// Ranking cutoff for precision/recall/NDCG
        #[arg(long, default_value = "5")]
        k: usize,

        /// How many test users to sample
        #[arg(long, default_value = "100")]
        sample: usize,

        /// Seed for user sampling and hold-out selection
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Also evaluate each constituent strategy separately
        #[arg(long)]
        breakdown: bool,
    },

    /// Evaluate the hybrid at several sustainability weights
    CompareWeights {
        /// Weights to sweep
        #[arg(long, value_delimiter = ',', default_value = "0.0,0.3,0.7,1.0")]
        weights: Vec<f32>,

        /// Ranking cutoff for precision/recall/NDCG
        #[arg(long, default_value = "5")]
        k: usize,

        /// How many test users to sample
        #[arg(long, default_value = "100")]
        sample: usize,

        /// Seed for user sampling and hold-out selection
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Show a user profile and travel history
    User {
        /// User ID to display
        #[arg(long)]
        user_id: UserId,
    },

    /// Show destination details and activities
    Destination {
        /// Destination ID to display
        #[arg(long)]
        destination_id: DestinationId,
    },

    /// Chat with the recommendation assistant
    Chat {
        /// Catalog user the session recommends for
        #[arg(long, default_value = "1")]
        user_id: UserId,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    println!("Loading travel catalog from {}...", cli.data_dir.display());
    let start = Instant::now();
    let index = Arc::new(
        TravelIndex::load_from_files(&cli.data_dir).context("Failed to load travel catalog")?,
    );
    println!("{} Loaded catalog in {:?}", "✓".green(), start.elapsed());

    match cli.command {
        Commands::Recommend {
            user_id,
            limit,
            weight,
            include_visited,
            explain,
        } => handle_recommend(index, user_id, limit, weight, !include_visited, explain)?,
        Commands::Explain { destination_id } => handle_explain(index, destination_id)?,
        Commands::Counterfactual { destination_id } => {
            handle_counterfactual(index, destination_id)?
        }
        Commands::Evaluate {
            k,
            sample,
            seed,
            breakdown,
        } => handle_evaluate(index, k, sample, seed, breakdown)?,
        Commands::CompareWeights {
            weights,
            k,
            sample,
            seed,
        } => handle_compare_weights(index, weights, k, sample, seed)?,
        Commands::User { user_id } => handle_user(index, user_id)?,
        Commands::Destination { destination_id } => handle_destination(index, destination_id)?,
        Commands::Chat { user_id } => handle_chat(index, user_id)?,
    }

    Ok(())
}

/// Build and train the hybrid recommender, reporting timing.
fn fitted_hybrid(index: Arc<TravelIndex>) -> Result<HybridRecommender> {
    println!("Training recommendation strategies...");
    let start = Instant::now();
    let mut hybrid = HybridRecommender::new(index);
    hybrid.fit()?;
    println!("{} Trained in {:?}", "✓".green(), start.elapsed());
    Ok(hybrid)
}

/// Handle the 'recommend' command
fn handle_recommend(
    index: Arc<TravelIndex>,
    user_id: UserId,
    limit: usize,
    weight: f32,
    exclude_visited: bool,
    explain: bool,
) -> Result<()> {
    if index.user(user_id).is_none() {
        return Err(anyhow!("User {} not found", user_id));
    }

    let hybrid = fitted_hybrid(index.clone())?;
    let recommendations = hybrid.recommend_weighted(user_id, limit, exclude_visited, weight)?;
    print_recommendations(&recommendations);

    if explain {
        let explainer = RecommendationExplainer::new(index);
        for rec in &recommendations {
            println!();
            let profile = explainer.explain_sustainability(rec.destination_id)?;
            print_rationale(rec, &profile);
        }
    }
    Ok(())
}

/// Handle the 'explain' command
fn handle_explain(index: Arc<TravelIndex>, destination_id: DestinationId) -> Result<()> {
    let explainer = RecommendationExplainer::new(index);
    let profile = explainer.explain_sustainability(destination_id)?;

    println!(
        "{}",
        format!(
            "Sustainability profile: {} ({})",
            profile.name, profile.country
        )
        .bold()
        .blue()
    );
    println!("Overall score: {:.1}/10\n", profile.overall_score);

    println!("{:<24} {:>8} {:>10} {:>8}", "Metric", "Score", "Country", "Global");
    for (position, reading) in profile.metrics.iter().enumerate() {
        let country = profile
            .country_metrics
            .as_ref()
            .map(|metrics| format!("{:>10.1}", metrics[position].value))
            .unwrap_or_else(|| format!("{:>10}", "-"));
        let flag = if reading.imputed { " (imputed)" } else { "" };
        println!(
            "{:<24} {:>8.1} {} {:>8.1}{}",
            reading.kind.label(),
            reading.value,
            country,
            profile.global_metrics[position].value,
            flag
        );
    }

    if !profile.strengths.is_empty() {
        let labels: Vec<&str> = profile.strengths.iter().map(|k| k.label()).collect();
        println!("\n{} {}", "Strengths:".green().bold(), labels.join(", "));
    }
    if !profile.weaknesses.is_empty() {
        let labels: Vec<&str> = profile.weaknesses.iter().map(|k| k.label()).collect();
        println!("{} {}", "Weaknesses:".red().bold(), labels.join(", "));
    }
    if !profile.certifications.is_empty() {
        println!("Certifications: {}", profile.certifications.join(", "));
    }
    if !profile.transportation_options.is_empty() {
        println!(
            "Low-impact transport: {}",
            profile.transportation_options.join(", ")
        );
    }
    Ok(())
}

/// Handle the 'counterfactual' command
fn handle_counterfactual(index: Arc<TravelIndex>, destination_id: DestinationId) -> Result<()> {
    let explainer = RecommendationExplainer::new(index);
    match explainer.generate_counterfactual(destination_id)? {
        Counterfactual::NoneFound { destination_name, .. } => {
            println!(
                "{} {} is already the most sustainable comparable destination.",
                "✓".green(),
                destination_name
            );
        }
        Counterfactual::Found(report) => {
            println!(
                "{}",
                format!(
                    "{} ({:.1}/10) has a more sustainable alternative: {} ({:.1}/10, {:+.1})",
                    report.destination_name,
                    report.current_score,
                    report.better_destination_name,
                    report.better_score,
                    report.score_difference
                )
                .bold()
                .blue()
            );
            println!("\nPer-metric differences:");
            for delta in &report.metric_differences {
                let marker = if report.improvement_areas.contains(&delta.kind) {
                    "▲".green().to_string()
                } else {
                    " ".to_string()
                };
                println!("{} {:<24} {:+.1}", marker, delta.kind.label(), delta.delta);
            }
        }
    }
    Ok(())
}

/// Sample test users (those with at least one recorded interaction).
fn sample_test_users(index: &TravelIndex, sample: usize, seed: u64) -> Vec<UserId> {
    let interactions = index.interactions();
    let eligible: Vec<UserId> = index
        .users()
        .iter()
        .enumerate()
        .filter(|(user_idx, _)| interactions.has_interactions(*user_idx))
        .map(|(_, user)| user.id)
        .collect();

    let mut rng = StdRng::seed_from_u64(seed);
    let mut chosen: Vec<UserId> = eligible
        .choose_multiple(&mut rng, sample.min(eligible.len()))
        .copied()
        .collect();
    chosen.sort_unstable();
    chosen
}

/// Handle the 'evaluate' command
fn handle_evaluate(
    index: Arc<TravelIndex>,
    k: usize,
    sample: usize,
    seed: u64,
    breakdown: bool,
) -> Result<()> {
    let test_users = sample_test_users(&index, sample, seed);
    if test_users.is_empty() {
        return Err(anyhow!("No users with interactions to evaluate against"));
    }
    println!("Evaluating on {} test users at k={}", test_users.len(), k);

    let options = EvalOptions {
        seed,
        ..EvalOptions::default()
    };
    let hybrid = fitted_hybrid(index.clone())?;

    let rows = if breakdown {
        let collaborative = CollaborativeFilteringRecommender::new(index.clone());
        let content = {
            let mut content = ContentBasedRecommender::new(index.clone());
            content.fit()?;
            content
        };
        let neural = {
            let mut neural = NeuralCfRecommender::new(index.clone());
            neural.fit()?;
            neural
        };
        evaluation::compare(
            &[
                ("collaborative", &collaborative),
                ("content", &content),
                ("neural", &neural),
                ("hybrid", &hybrid),
            ],
            &test_users,
            k,
            &options,
        )?
    } else {
        vec![ComparisonRow {
            label: "hybrid".to_string(),
            metrics: evaluation::evaluate(&hybrid, &test_users, k, &options)?,
        }]
    };

    print_comparison(&rows, k);
    Ok(())
}

/// Handle the 'compare-weights' command
fn handle_compare_weights(
    index: Arc<TravelIndex>,
    weights: Vec<f32>,
    k: usize,
    sample: usize,
    seed: u64,
) -> Result<()> {
    let test_users = sample_test_users(&index, sample, seed);
    if test_users.is_empty() {
        return Err(anyhow!("No users with interactions to evaluate against"));
    }
    println!(
        "Sweeping {} sustainability weights on {} test users at k={}",
        weights.len(),
        test_users.len(),
        k
    );

    let options = EvalOptions {
        seed,
        ..EvalOptions::default()
    };
    let hybrid = fitted_hybrid(index)?;
    let rows = evaluation::compare_sustainability_weights(&hybrid, &weights, &test_users, k, &options)?;

    print_comparison(&rows, k);
    Ok(())
}

/// Handle the 'user' command
fn handle_user(index: Arc<TravelIndex>, user_id: UserId) -> Result<()> {
    let user = index
        .user(user_id)
        .ok_or_else(|| anyhow!("User {} not found", user_id))?;

    println!("{}", format!("User {}", user_id).bold().blue());
    println!("{}Age group: {}", "• ".green(), user.age_group);
    println!("{}Travel style: {}", "• ".green(), user.travel_style);
    println!("{}Budget level: {}/5", "• ".green(), user.budget_level);
    println!(
        "{}Sustainability preference: {:.1}/10",
        "• ".green(),
        user.sustainability_preference
    );
    if !user.interests.is_empty() {
        println!("{}Interests: {}", "• ".green(), user.interests.join(", "));
    }

    println!("\nTravel history ({} destinations):", user.travel_history.len());
    for &destination_id in &user.travel_history {
        if let Some(destination) = index.destination(destination_id) {
            println!("  - {} ({})", destination.name, destination.country);
        }
    }
    Ok(())
}

/// Handle the 'destination' command
fn handle_destination(index: Arc<TravelIndex>, destination_id: DestinationId) -> Result<()> {
    let destination = index
        .destination(destination_id)
        .ok_or_else(|| anyhow!("Destination {} not found", destination_id))?;
    let explainer = RecommendationExplainer::new(index.clone());
    let score = explainer.scorer().score_destination(destination);

    println!(
        "{}",
        format!("{} ({})", destination.name, destination.country).bold().blue()
    );
    println!("{}Region: {}", "• ".green(), destination.region);
    println!("{}Landscape: {}", "• ".green(), destination.landscape_type);
    println!("{}Climate: {}", "• ".green(), destination.climate);
    println!("{}Category: {}", "• ".green(), destination.category);
    println!("{}Sustainability score: {:.1}/10", "• ".green(), score);
    if !destination.eco_certifications.is_empty() {
        println!(
            "{}Certifications: {}",
            "• ".green(),
            destination.eco_certifications.join(", ")
        );
    }

    let activities = index.activities_for(destination_id);
    if !activities.is_empty() {
        println!("\nActivities:");
        for activity in activities {
            println!(
                "  - {} [{}] eco rating {:.1}/10",
                activity.name, activity.category, activity.eco_friendliness
            );
        }
    }
    Ok(())
}

/// Handle the 'chat' command: a line-based REPL over the chatbot.
fn handle_chat(index: Arc<TravelIndex>, user_id: UserId) -> Result<()> {
    if index.user(user_id).is_none() {
        return Err(anyhow!("User {} not found", user_id));
    }

    let hybrid = fitted_hybrid(index.clone())?;
    let mut bot = TourismChatbot::new(index, hybrid, user_id);

    println!(
        "\n{}",
        "Chat with the sustainable tourism assistant (type 'quit' to leave)".bold()
    );
    let stdin = std::io::stdin();
    loop {
        print!("{} ", "You:".cyan().bold());
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message.eq_ignore_ascii_case("quit") || message.eq_ignore_ascii_case("exit") {
            break;
        }

        let reply = bot.process_message(message);
        println!("{} {}\n", "Bot:".green().bold(), reply);
    }
    println!("Goodbye!");
    Ok(())
}

/// Print a ranked recommendation list.
fn print_recommendations(recommendations: &[Recommendation]) {
    println!("\n{}", "Recommended destinations:".bold().blue());
    for (rank, rec) in recommendations.iter().enumerate() {
        let sources: Vec<&str> = rec.sources.iter().map(|s| s.label()).collect();
        println!(
            "{}. {} ({}) - score {:.3}, sustainability {:.1}/10 [{}]",
            (rank + 1).to_string().green(),
            rec.name,
            rec.country,
            rec.final_score,
            rec.sustainability_score,
            sources.join(", ")
        );
    }
}

/// Print the sustainability rationale attached to one recommendation.
fn print_rationale(rec: &Recommendation, profile: &SustainabilityProfile) {
    println!("{}", format!("Why {}:", rec.name).bold());
    if !profile.strengths.is_empty() {
        let labels: Vec<&str> = profile.strengths.iter().map(|k| k.label()).collect();
        println!("  Strong on {}", labels.join(", "));
    }
    if !profile.weaknesses.is_empty() {
        let labels: Vec<&str> = profile.weaknesses.iter().map(|k| k.label()).collect();
        println!("  Weaker on {}", labels.join(", "));
    }
    if !profile.certifications.is_empty() {
        println!("  Certified: {}", profile.certifications.join(", "));
    }
}

/// Print evaluation rows as a table.
fn print_comparison(rows: &[ComparisonRow], k: usize) {
    println!(
        "\n{:<16} {:>10} {:>10} {:>10} {:>8} {:>10} {:>8}",
        "configuration",
        format!("p@{}", k),
        format!("r@{}", k),
        format!("ndcg@{}", k),
        "eco",
        "diversity",
        "users"
    );
    for row in rows {
        let m = &row.metrics;
        println!(
            "{:<16} {:>10.3} {:>10.3} {:>10.3} {:>8.2} {:>10.3} {:>8}",
            row.label, m.precision, m.recall, m.ndcg, m.avg_sustainability, m.avg_diversity,
            m.users_evaluated
        );
    }
}
