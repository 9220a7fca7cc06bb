use choolgo_core::channel::filename::FilenameClassifier;
use choolgo_core::channel::ChannelClassifier;
use choolgo_core::error::ChoolgoError;
use std::path::PathBuf;

pub fn run(paths: &[PathBuf], by_filename: bool) -> Result<(), ChoolgoError> {
    let classifier = FilenameClassifier::new(ChannelClassifier::standard()?)?;

    for path in paths {
        let rule = if by_filename {
            classifier.detect(path)
        } else {
            classifier.paths().detect_channel(path)
        };
        match rule {
            Some(r) => println!(
                "{}\t{} ({}, {} parser)",
                path.display(),
                r.name,
                r.id,
                r.parser.label()
            ),
            None => println!("{}\t-", path.display()),
        }
    }

    Ok(())
}
