use chrono::{Days, Utc};
use dress_rental::{
    config::AppConfig,
    db,
    models::{AvailabilityStatus, NewAvailability, NewDress},
    state::AppState,
};
use uuid::Uuid;

struct DemoDress {
    title: &'static str,
    types: &'static [&'static str],
    colors: &'static [&'static str],
    size: &'static str,
    price: f64,
    description: &'static str,
    pickup_location: &'static str,
}

const DEMO_DRESSES: [DemoDress; 4] = [
    DemoDress {
        title: "Black Satin Slip Dress",
        types: &["Party", "Semi-Formal"],
        colors: &["Black"],
        size: "S",
        price: 18.0,
        description: "Midi length, adjustable straps. Worn twice.",
        pickup_location: "Sather Gate",
    },
    DemoDress {
        title: "Navy Interview Sheath",
        types: &["Work"],
        colors: &["Navy"],
        size: "M",
        price: 12.5,
        description: "Knee length with pockets, good for career fair.",
        pickup_location: "Moffitt Library",
    },
    DemoDress {
        title: "Emerald Formal Gown",
        types: &["Formal"],
        colors: &["Green", "Gold"],
        size: "L",
        price: 35.0,
        description: "Floor length with a gold beaded waist.",
        pickup_location: "MLK Student Union",
    },
    DemoDress {
        title: "Floral Sundress",
        types: &["Casual"],
        colors: &["Yellow", "White"],
        size: "XS",
        price: 8.0,
        description: "Light cotton, perfect for Memorial Glade picnics.",
        pickup_location: "Memorial Glade",
    },
];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,dress_rental=debug".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    let owner_id: Uuid = std::env::var("SEED_OWNER_ID")
        .map_err(|_| anyhow::anyhow!("SEED_OWNER_ID is not set"))?
        .parse()?;
    // Row-level security only lets owners insert their own listings.
    let access_token = std::env::var("SEED_ACCESS_TOKEN").ok();
    let auth = access_token.as_deref();

    let state = AppState::from_config(config)?;
    let backend = state.backend.as_ref();

    let mut first_id = None;
    for demo in &DEMO_DRESSES {
        let dress = NewDress {
            owner_id,
            title: demo.title.to_string(),
            types: owned(demo.types),
            colors: owned(demo.colors),
            size: demo.size.to_string(),
            price: demo.price,
            description: demo.description.to_string(),
            image_url: vec![backend.public_url(
                "dresses",
                &format!("dress-images/demo-{}.jpg", demo.size.to_lowercase()),
            )],
            pickup_location: demo.pickup_location.to_string(),
            custom_pickup_location: None,
            is_active: true,
        };
        let created = db::dresses::create(backend, &dress, auth).await?;
        println!("Seeded dress {} ({})", created.title, created.id);
        first_id.get_or_insert(created.id);
    }

    if let Some(dress_id) = first_id {
        let today = Utc::now().date_naive();
        let blocked = NewAvailability {
            dress_id,
            start_date: today + Days::new(3),
            end_date: today + Days::new(5),
            is_available: false,
            renter_id: None,
            status: AvailabilityStatus::Reserved,
        };
        let record = db::availability::create(backend, &blocked, auth).await?;
        println!(
            "Blocked {} to {} on {dress_id}",
            record.start_date, record.end_date
        );
    }

    println!("Seed completed for owner {owner_id}");
    Ok(())
}
