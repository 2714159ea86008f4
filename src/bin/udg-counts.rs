use structopt::StructOpt;
use udg_selection::{selection, CatalogLoader};

#[derive(Debug, StructOpt)]
#[structopt(name = "udg-counts", about = "UDG selection counts per simulation")]
struct Opt {
    /// Path to the galaxy catalogue repository
    #[structopt(long)]
    path: Option<String>,
    /// Catalogue file, overrides --path
    #[structopt(short, long)]
    file: Option<String>,
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
    let catalog = loader.load()?;
    selection::print_counts(&catalog);

    Ok(())
}
