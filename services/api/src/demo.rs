use std::sync::Arc;

use clap::Args;

use campus_match::error::AppError;
use campus_match::social::conversations::{MessageBus, MessagingService};
use campus_match::social::friends::FriendGraphService;
use campus_match::social::matching::{DiscoverFilter, MatchScorer};
use campus_match::social::profiles::{ClassYear, ProfileDraft, ProfileId, ProfileService};

use crate::infra::{
    InMemoryConversationRepository, InMemoryFriendRepository, InMemoryProfileRepository,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Profile to run the walkthrough as (one of: maya, theo, june, sam)
    #[arg(long, default_value = "maya")]
    pub(crate) viewer: String,
    /// Skip the messaging portion of the demo
    #[arg(long)]
    pub(crate) skip_chat: bool,
}

struct Seed {
    id: &'static str,
    name: &'static str,
    major: &'static str,
    year: ClassYear,
    interests: &'static [&'static str],
    looking_for: &'static [&'static str],
    area: &'static str,
}

const COHORT: &[Seed] = &[
    Seed {
        id: "maya",
        name: "Maya Okafor",
        major: "Computer Science",
        year: ClassYear::Junior,
        interests: &["Gaming", "Music", "Coding"],
        looking_for: &["Friends", "Study Buddies"],
        area: "North Neighborhood",
    },
    Seed {
        id: "theo",
        name: "Theo Lindgren",
        major: "computer science",
        year: ClassYear::Junior,
        interests: &["Gaming", "Music", "Hiking"],
        looking_for: &["Friends"],
        area: "North Neighborhood",
    },
    Seed {
        id: "june",
        name: "June Park",
        major: "Graphic Design",
        year: ClassYear::Sophomore,
        interests: &["Photography", "Movies", "Music"],
        looking_for: &["Friends", "Clubs"],
        area: "East Neighborhood",
    },
    Seed {
        id: "sam",
        name: "Sam Whitfield",
        major: "History",
        year: ClassYear::Senior,
        interests: &["Reading", "Hiking"],
        looking_for: &["Study Buddies"],
        area: "River Trail",
    },
];

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { viewer, skip_chat } = args;

    let profiles = Arc::new(InMemoryProfileRepository::default());
    let friends = Arc::new(InMemoryFriendRepository::default());
    let conversations = Arc::new(InMemoryConversationRepository::default());
    let bus = Arc::new(MessageBus::default());

    let profile_service = ProfileService::new(profiles.clone());
    let friend_service =
        FriendGraphService::new(friends, profiles.clone(), MatchScorer::default());
    let messaging_service = MessagingService::new(conversations, profiles, bus);

    println!("Campus Match demo");
    println!("=================");

    for seed in COHORT {
        let draft = ProfileDraft {
            full_name: seed.name.to_string(),
            major: Some(seed.major.to_string()),
            year: Some(seed.year),
            interests: seed.interests.iter().map(|i| i.to_string()).collect(),
            looking_for: seed.looking_for.iter().map(|l| l.to_string()).collect(),
            campus_area: Some(seed.area.to_string()),
            ..ProfileDraft::default()
        };
        profile_service
            .upsert(&ProfileId(seed.id.to_string()), draft)
            .map_err(demo_failure)?;
    }
    println!("Seeded {} profiles.", COHORT.len());

    let viewer_id = ProfileId(viewer.clone());
    let feed = friend_service
        .discover(&viewer_id, &DiscoverFilter::default())
        .map_err(demo_failure)?;

    println!("\nDiscovery feed for {viewer}:");
    for candidate in &feed {
        println!(
            "  {:>3}%  {}  [{}]",
            candidate.score,
            candidate.profile.full_name,
            candidate.relationship.label()
        );
        for reason in candidate.reasons.iter().take(2) {
            println!("         - {reason}");
        }
    }

    let Some(best) = feed.first() else {
        println!("\nNo candidates to connect with; demo ends here.");
        return Ok(());
    };

    println!(
        "\n{viewer} sends a friend request to {} ...",
        best.profile.full_name
    );
    let request = friend_service
        .send_request(
            &viewer_id,
            &best.profile.id,
            Some("Met at the club fair - want to connect?".to_string()),
        )
        .map_err(demo_failure)?;
    println!(
        "  request {} is {}",
        request.id,
        request.status.label()
    );

    friend_service
        .accept_request(&best.profile.id, &request.id)
        .map_err(demo_failure)?;
    let state = friend_service
        .relationship(&viewer_id, &best.profile.id)
        .map_err(demo_failure)?;
    println!(
        "  {} accepted; relationship is now {}",
        best.profile.full_name,
        state.label()
    );

    if skip_chat {
        return Ok(());
    }

    println!("\nOpening a direct conversation ...");
    let conversation = messaging_service
        .open_direct(&viewer_id, &best.profile.id)
        .map_err(demo_failure)?;
    messaging_service
        .send_message(&viewer_id, &conversation.id, "Hey! Good to be connected.")
        .map_err(demo_failure)?;
    messaging_service
        .send_message(
            &best.profile.id,
            &conversation.id,
            "Likewise - see you at game night?",
        )
        .map_err(demo_failure)?;

    let list = messaging_service
        .conversation_list(&viewer_id)
        .map_err(demo_failure)?;
    for summary in &list {
        println!(
            "  {} | {} unread | last: {}",
            summary.display_name,
            summary.unread_count,
            summary
                .last_message
                .as_ref()
                .map(|message| message.content.as_str())
                .unwrap_or("(none)")
        );
    }

    let marked = messaging_service
        .mark_read(&viewer_id, &conversation.id)
        .map_err(demo_failure)?;
    println!("Marked {marked} message(s) read. Demo complete.");

    Ok(())
}

fn demo_failure(error: impl std::error::Error + Send + Sync + 'static) -> AppError {
    AppError::domain(error)
}
