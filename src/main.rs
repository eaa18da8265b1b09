use anyhow::{bail, Result};
use log::{info, warn};

use nirvana_cache::{open_cache_pair, transcript_forest, CacheIndex, GeneSymbols, ReferenceCache};

fn print_index(index: &CacheIndex) {
    println!("reference\tbase_offset\tbins\tfirst_bin\tlast_bin");
    for reference in index.references() {
        let bins = reference.bins();
        let first = bins.first().map_or(String::from("-"), |b| b.bin.to_string());
        let last = bins.last().map_or(String::from("-"), |b| b.bin.to_string());
        println!(
            "{}\t{}\t{}\t{}\t{}",
            reference.ref_index(),
            reference.position(),
            reference.num_bins(),
            first,
            last
        );
    }
}

fn print_features(caches: &[Option<ReferenceCache>]) {
    println!("reference\tgenes\ttranscripts\tregulatory_regions");
    for cache in caches.iter().flatten() {
        let genes: usize = cache.bins.iter().map(|bin| bin.genes.len()).sum();
        println!(
            "{}\t{}\t{}\t{}",
            cache.ref_index,
            genes,
            cache.transcripts().count(),
            cache.regulatory_regions().count()
        );
    }
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (data_path, symbols_path) = match args.as_slice() {
        [data] => (data, None),
        [data, symbols] => (data, Some(symbols)),
        _ => bail!("usage: cache-stats <data-file> [gene-symbols.tsv]"),
    };

    let symbols = match symbols_path {
        Some(path) => GeneSymbols::from_path(path)?,
        None => GeneSymbols::new(),
    };
    let (mut reader, index) = open_cache_pair(data_path, symbols)?;

    let header = reader.header();
    info!(
        "{} {} ({:?}), released at tick {}",
        header.source.name, header.source.version, header.assembly, header.source.release_ticks
    );
    print_index(&index);

    if symbols_path.is_none() {
        warn!("No gene symbol table given; skipping feature decoding");
        return Ok(());
    }
    let caches = reader.get_reference_caches()?;
    print_features(&caches);

    let forest = transcript_forest(&caches)?;
    let with_data = (0..forest.num_refs())
        .filter_map(|i| u16::try_from(i).ok())
        .filter(|&i| forest.get(i).is_some())
        .count();
    info!("Built transcript interval arrays for {with_data} references");
    Ok(())
}
