use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use lrs_segments::domain::LrsDirection;
use lrs_segments::feature_service::{
    FeatureService, FeatureServiceConfig, FixtureTransport, HttpTransport, Transport,
};
use lrs_segments::segments::{DEFAULT_OUT_SR, ResolveConfig, RouteSegmentQuery, SegmentResolver};

/// Print the route geometry between two state route mileposts.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Route id, e.g. 005
    route: String,

    /// Begin milepost, e.g. 118 or 118.5B
    begin: String,

    /// End milepost
    end: String,

    /// Only this direction (i or d); both when omitted
    #[arg(short, long)]
    direction: Option<LrsDirection>,

    /// Output spatial reference wkid
    #[arg(long, default_value_t = DEFAULT_OUT_SR)]
    out_sr: u32,

    /// LRS map/feature service URL
    #[arg(long, env = "LRS_AND_MP_SERVICE_URL")]
    url: Option<String>,

    /// Serve responses from saved JSON files instead of the service (wins over --url)
    #[arg(long)]
    fixtures: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Multiplier from ARM to route measure units
    #[arg(long, default_value_t = 1.0)]
    measure_scale: f64,

    /// Print one JSON object per segment
    #[arg(long)]
    json: bool,

    /// Stop after this many segments
    #[arg(long)]
    limit: Option<usize>,
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), BoxError> {
    let mut query = RouteSegmentQuery::parse(&args.route, &args.begin, &args.end)?
        .with_out_sr(args.out_sr);
    if let Some(direction) = args.direction {
        query = query.with_direction(direction);
    }

    let config = ResolveConfig::default().with_measure_scale(args.measure_scale);

    match (&args.fixtures, &args.url) {
        (Some(dir), _) => {
            let transport = FixtureTransport::new(dir)?;
            print_segments(transport, &query, config, &args).await
        }
        (None, Some(url)) => {
            let transport =
                HttpTransport::new(FeatureServiceConfig::new(url).with_timeout(args.timeout))?;
            print_segments(transport, &query, config, &args).await
        }
        (None, None) => Err("no service URL: pass --url or set LRS_AND_MP_SERVICE_URL".into()),
    }
}

async fn print_segments<T: Transport>(
    transport: T,
    query: &RouteSegmentQuery,
    config: ResolveConfig,
    args: &Args,
) -> Result<(), BoxError> {
    let resolver = SegmentResolver::new(FeatureService::new(transport)).with_config(config);
    let segments = resolver.resolve(query).await?;

    for segment in segments.take(args.limit.unwrap_or(usize::MAX)) {
        let segment = segment?;

        if args.json {
            println!("{}", serde_json::to_string(&segment)?);
        } else {
            println!(
                "{}  ARM {} to {}  {} path(s), {} vertices",
                segment.route_id,
                segment.measures.begin_arm,
                segment.measures.end_arm,
                segment.route_segment.path_count(),
                segment.route_segment.vertex_count(),
            );
        }
    }

    Ok(())
}
