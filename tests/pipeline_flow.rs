//! End-to-end stage flow over in-memory data
//!
//! Exercises reconciliation, classification and generation together the way
//! the pipeline engine wires them, without touching the network: the guide
//! and the ingested channels are built directly, outputs land in a temp dir.

use m3u_aggregator::config::{
    ClassifyConfig, Config, KeywordGroup, StreamSourceConfig, StreamSourceType,
};
use m3u_aggregator::models::{Channel, EpgChannel, EpgGuide, StreamHeaders};
use m3u_aggregator::pipeline::stages::classify::ClassifyStage;
use m3u_aggregator::pipeline::stages::generation::GenerationStage;
use m3u_aggregator::pipeline::stages::reconcile::ReconcileStage;
use m3u_aggregator::pipeline::stages::SourceChannels;
use m3u_aggregator::utils::StandardHttpClient;

fn channel(name: &str, url: &str) -> Channel {
    Channel {
        name: name.to_string(),
        tvg_id: None,
        tvg_name: None,
        tvg_logo: None,
        group_title: None,
        stream_url: url.to_string(),
        http_headers: None,
        source_name: "vavoo".to_string(),
    }
}

fn guide_channel(id: &str, name: &str, icon: Option<&str>) -> EpgChannel {
    EpgChannel {
        channel_id: id.to_string(),
        display_name: name.to_string(),
        icon_url: icon.map(str::to_string),
    }
}

fn source_config() -> StreamSourceConfig {
    StreamSourceConfig {
        name: "vavoo".to_string(),
        source_type: StreamSourceType::ChannelApi,
        url: "https://host.example/channels".to_string(),
        enabled: true,
        country: Some("Italy".to_string()),
        play_url_template: Some("https://host.example/play/{id}/index.m3u8".to_string()),
        rename_rules: Vec::new(),
        exclude_names: Vec::new(),
        exclude_group_title: None,
        append_header_params: false,
        schedule: None,
        group_title: None,
        headers: Some(StreamHeaders {
            user_agent: Some("VAVOO/2.6".to_string()),
            referrer: None,
            origin: None,
        }),
    }
}

fn test_config(output_dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.output.directory = output_dir.to_path_buf();
    config.output.tvg_url = Some("https://guide.example/epg.xml".to_string());
    config.classify = ClassifyConfig {
        services: vec![KeywordGroup {
            name: "DTT".to_string(),
            keywords: vec!["rai".to_string()],
        }],
        categories: vec![
            KeywordGroup {
                name: "Sport".to_string(),
                keywords: vec!["sport".to_string()],
            },
            KeywordGroup {
                name: "General".to_string(),
                keywords: vec!["rai".to_string(), "canale".to_string()],
            },
        ],
        default_service: "Free".to_string(),
        default_category: "Other".to_string(),
    };
    config
}

fn guide() -> EpgGuide {
    EpgGuide {
        channels: vec![
            guide_channel("rai1.it", "Rai 1", Some("https://logos.example/rai1.png")),
            guide_channel("skysport.it", "Sky Sport", None),
        ],
        programs: vec![],
    }
}

async fn run_stages(
    config: &Config,
    sources: Vec<SourceChannels>,
    guide: &EpgGuide,
) -> Vec<SourceChannels> {
    let http_client = StandardHttpClient::new(&config.http);
    let (mut sources, _) = ReconcileStage::new(config)
        .unwrap()
        .run(sources, guide, &http_client)
        .await;
    ClassifyStage::new(&config.classify).run(&mut sources);
    sources
}

#[tokio::test]
async fn reconciles_fuzzy_names_to_guide_ids() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let sources = vec![SourceChannels {
        config: source_config(),
        channels: vec![
            channel("Rai Uno HD", "https://host.example/play/1/index.m3u8"),
            channel("Sky Sport FHD", "https://host.example/play/2/index.m3u8"),
            channel("Totally Unknown XYZ", "https://host.example/play/3/index.m3u8"),
        ],
    }];

    let sources = run_stages(&config, sources, &guide()).await;
    let channels = &sources[0].channels;

    let rai = channels.iter().find(|c| c.name == "Rai Uno HD").unwrap();
    assert_eq!(rai.tvg_id.as_deref(), Some("rai1.it"));
    // The matched guide entry's icon travels onto the channel
    assert_eq!(
        rai.tvg_logo.as_deref(),
        Some("https://logos.example/rai1.png")
    );

    let sky = channels.iter().find(|c| c.name == "Sky Sport FHD").unwrap();
    assert_eq!(sky.tvg_id.as_deref(), Some("skysport.it"));

    let unknown = channels
        .iter()
        .find(|c| c.name == "Totally Unknown XYZ")
        .unwrap();
    assert_eq!(unknown.tvg_id, None);
}

#[tokio::test]
async fn classification_orders_and_groups_channels() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let sources = vec![SourceChannels {
        config: source_config(),
        channels: vec![
            channel("Canale 5", "https://host.example/play/5/index.m3u8"),
            channel("Sky Sport FHD", "https://host.example/play/2/index.m3u8"),
        ],
    }];

    let sources = run_stages(&config, sources, &guide()).await;
    let channels = &sources[0].channels;

    // Sport is configured before General, so Sky Sport sorts first
    assert_eq!(channels[0].name, "Sky Sport FHD");
    assert_eq!(channels[0].group_title.as_deref(), Some("Sport"));
    assert_eq!(channels[1].group_title.as_deref(), Some("General"));
}

#[tokio::test]
async fn generation_writes_all_output_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let guide = guide();

    let mut rai = channel("Rai Uno HD", "https://host.example/play/1/index.m3u8");
    rai.http_headers = Some(StreamHeaders {
        user_agent: Some("VAVOO/2.6".to_string()),
        referrer: None,
        origin: None,
    });
    let sources = vec![SourceChannels {
        config: source_config(),
        channels: vec![rai],
    }];

    let sources = run_stages(&config, sources, &guide).await;
    let outputs = GenerationStage::new(&config).run(&sources, &guide).unwrap();

    let names: Vec<String> = outputs
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "vavoo.m3u8",
            "combined_playlist.m3u8",
            "combined_playlist.m3u",
            "epg.xml",
            "epg.xml.gz",
        ]
    );

    let combined = std::fs::read_to_string(dir.path().join("combined_playlist.m3u8")).unwrap();
    assert!(combined.starts_with("#EXTM3U tvg-url=\"https://guide.example/epg.xml\"\n"));
    assert!(combined.contains("tvg-id=\"rai1.it\""));
    assert!(combined.contains("#EXTVLCOPT:http-user-agent=VAVOO/2.6"));

    let m3u = std::fs::read_to_string(dir.path().join("combined_playlist.m3u")).unwrap();
    assert!(m3u.starts_with("#EXTM3U x-tvg-url=\"https://guide.example/epg.xml\"\n"));

    let epg = std::fs::read_to_string(dir.path().join("epg.xml")).unwrap();
    assert!(epg.contains("rai1.it"));
}

#[tokio::test]
async fn merge_options_shape_the_combined_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let guide = EpgGuide::default();

    let mut world_config = source_config();
    world_config.name = "world".to_string();
    world_config.exclude_group_title = Some("Italy".to_string());
    world_config.headers = None;

    let mut italy_channel = channel("Rai 1", "https://host.example/play/1/index.m3u8");
    italy_channel.group_title = Some("Italy".to_string());
    let mut france_channel = channel("TF1", "https://host.example/play/9/index.m3u8");
    france_channel.group_title = Some("France".to_string());

    let sources = vec![SourceChannels {
        config: world_config,
        channels: vec![italy_channel, france_channel],
    }];

    let sources = run_stages(&config, sources, &guide).await;
    GenerationStage::new(&config).run(&sources, &guide).unwrap();

    // Per-source playlist keeps everything
    let world = std::fs::read_to_string(dir.path().join("world.m3u8")).unwrap();
    assert!(world.contains("Rai 1"));
    assert!(world.contains("TF1"));

    // Combined output drops the excluded group
    let combined = std::fs::read_to_string(dir.path().join("combined_playlist.m3u8")).unwrap();
    assert!(!combined.contains("Rai 1"));
    assert!(combined.contains("TF1"));

    // No guide entries, so no guide files
    assert!(!dir.path().join("epg.xml").exists());
}
