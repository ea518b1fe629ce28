use std::sync::Arc;

use clap::Args;
use realty_catalog::catalog::{
    Agent, AssetFile, CatalogService, FilterForm, ListingDraft, ListingForm, ListingStatus,
    PropertyType, SessionRecord, SessionStore, UploadPipeline,
};
use realty_catalog::config::AppConfig;
use realty_catalog::error::AppError;
use realty_catalog::telemetry;

use crate::infra::{InMemoryObjectStorage, InMemoryRecordStore, LocalSessionStore};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Upload pipeline concurrency override
    #[arg(long)]
    pub(crate) concurrency: Option<usize>,
}

/// Sample catalog used by the demo and by `serve --seed`.
pub(crate) fn seed_drafts() -> Vec<ListingDraft> {
    vec![
        draft(
            "Lekki family house",
            "Lagos",
            40_000_000,
            PropertyType::House,
            ListingStatus::Sale,
            3,
            "demo@ramosrealty.ng",
        ),
        draft(
            "Garden city house",
            "Port Harcourt",
            60_000_000,
            PropertyType::House,
            ListingStatus::Sale,
            4,
            "other@ramosrealty.ng",
        ),
        draft(
            "Wuse studio",
            "Abuja",
            800_000,
            PropertyType::Studio,
            ListingStatus::Rent,
            1,
            "demo@ramosrealty.ng",
        ),
    ]
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(concurrency) = args.concurrency {
        config.storage.upload_concurrency = concurrency.max(1);
    }
    telemetry::init(&config.telemetry)?;

    let records = Arc::new(InMemoryRecordStore::default());
    records.seed(seed_drafts());
    let storage = Arc::new(InMemoryObjectStorage::default());
    let session = Arc::new(LocalSessionStore::default());
    session.set(SessionRecord {
        email: "demo@ramosrealty.ng".to_string(),
        token: "demo-session".to_string(),
    });

    let pipeline = UploadPipeline::new(storage.clone(), &config.storage);
    let service = CatalogService::new(records, session, pipeline);

    let count = service.load_catalog().await?;
    println!("Catalog loaded: {count} listings");

    // Affordable three-bedroom houses, the shopper's classic query.
    let form = FilterForm {
        property_type: "house".to_string(),
        status: "all".to_string(),
        max_price: "50000000".to_string(),
        bedrooms: "3".to_string(),
        ..FilterForm::default()
    };
    let visible = service.visible(&form.criteria());
    println!("Houses under 50M with 3+ bedrooms:");
    for listing in &visible {
        println!(
            "  {} — {} ({} beds, NGN {})",
            listing.id, listing.draft.title, listing.draft.bedrooms, listing.draft.price
        );
    }

    if let Some(first) = visible.first() {
        service.toggle_favorite(&first.id);
        println!("Favorited {}; marked: {:?}", first.id, service.favorites());
        service.toggle_favorite(&first.id);
        println!("Toggled back; marked: {:?}", service.favorites());
    }

    // Submit a new listing; the middle asset fails on purpose and is
    // skipped without aborting the batch.
    let submission = ListingForm {
        title: "Ikoyi penthouse".to_string(),
        description: "Skyline views.".to_string(),
        location: "Lagos".to_string(),
        price: "120000000".to_string(),
        bedrooms: "4".to_string(),
        bathrooms: "4".to_string(),
        area: "3800".to_string(),
        property_type: "penthouse".to_string(),
        status: "For Sale".to_string(),
        year_built: "2021".to_string(),
        features: "pool, gym, concierge".to_string(),
        agent_name: "Demo Agent".to_string(),
        agent_phone: "+234 800 123 4567".to_string(),
        agent_email: "demo@ramosrealty.ng".to_string(),
        agent_rating: "4.8".to_string(),
    };
    let files = vec![
        demo_asset("front.jpg"),
        demo_asset("broken-lounge.jpg"),
        demo_asset("terrace.png"),
    ];
    let created = service.create_listing(submission, files).await?;
    println!(
        "Created {} with {} of 3 assets stored ({} objects in the bucket):",
        created.id,
        created.draft.images.len(),
        storage.object_count()
    );
    for url in &created.draft.images {
        println!("  {url}");
    }
    println!("Primary image: {}", created.draft.image);

    let mine = service.my_listings().await?;
    println!("My listings ({}):", mine.len());
    for listing in mine {
        println!("  {} — {}", listing.id, listing.draft.title);
    }

    Ok(())
}

fn demo_asset(name: &str) -> AssetFile {
    let content_type = mime_guess::from_path(name).first_or_octet_stream();
    AssetFile {
        file_name: name.to_string(),
        content_type,
        bytes: vec![0u8; 64],
    }
}

fn draft(
    title: &str,
    location: &str,
    price: u64,
    property_type: PropertyType,
    status: ListingStatus,
    bedrooms: u32,
    agent_email: &str,
) -> ListingDraft {
    ListingDraft {
        title: title.to_string(),
        description: String::new(),
        location: location.to_string(),
        price,
        property_type,
        status,
        bedrooms,
        bathrooms: bedrooms.max(1),
        area: 600 * bedrooms.max(1),
        year_built: None,
        features: vec!["parking".to_string()],
        image: String::new(),
        images: Vec::new(),
        agent: Agent {
            name: "Demo Agent".to_string(),
            phone: "+234 800 123 4567".to_string(),
            email: agent_email.to_string(),
            rating: Some(4.8),
        },
    }
}
