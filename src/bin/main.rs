use structopt::StructOpt;
use udg_selection::{selection, CatalogLoader, PaperStyle, SelectionFigure};

#[derive(Debug, StructOpt)]
#[structopt(name = "udg-selection", about = "UDG selection criteria figure")]
struct Opt {
    /// Path to the galaxy catalogue repository
    #[structopt(long)]
    path: Option<String>,
    /// Catalogue file, overrides --path
    #[structopt(short, long)]
    file: Option<String>,
    /// Simulation identifier regular expression filter
    #[structopt(long)]
    sim: Option<String>,
    /// Figure file
    #[structopt(short, long, default_value = "fig1_selection_criteria.svg")]
    output: String,
    /// Figure style sheet
    #[structopt(long, default_value = "paper.style.json")]
    style: String,
    /// Write the fiducial UDG catalogue to a CSV file
    #[structopt(long)]
    csv: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let mut loader = CatalogLoader::default();
    if let Some(arg) = opt.path {
        loader = loader.data_path(arg);
    }
    if let Some(arg) = opt.file {
        loader = loader.file_path(arg);
    }
    if let Some(arg) = opt.sim {
        loader = loader.sim_filter(arg);
    }
    let catalog = loader.load()?;

    selection::print_counts(&catalog);

    let style = PaperStyle::load(&opt.style)?;
    SelectionFigure::default()
        .with_style(&style)
        .render(&catalog, &opt.output);

    if let Some(filename) = opt.csv {
        catalog.to_csv(filename)?;
    }

    Ok(())
}
