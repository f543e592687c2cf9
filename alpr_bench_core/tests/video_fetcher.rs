use std::fs;
use std::path::Path;

use anyhow::Result;
use parking_lot::Mutex;
use url::Url;

use alpr_bench_core::configuration::default_endpoint;
use alpr_bench_core::fetcher::{Transport, VideoFetcher, VideoFile};
use alpr_bench_core::resolution::ResolutionSelector;

#[derive(Default)]
struct FakeServer {
    served: Mutex<Vec<String>>,
}

impl Transport for FakeServer {
    fn fetch(&self, url: &Url, dest: &Path) -> alpr_bench_core::Result<u64> {
        self.served.lock().push(url.path().to_string());
        fs::write(dest, url.as_str().as_bytes()).unwrap();
        Ok(url.as_str().len() as u64)
    }
}

fn names(videos: &[VideoFile]) -> Vec<String> {
    videos
        .iter()
        .map(|v| v.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn all_and_explicit_list_fetch_the_same_files() -> Result<()> {
    let all_dir = tempfile::tempdir()?;
    let list_dir = tempfile::tempdir()?;

    let all = VideoFetcher::new(&default_endpoint(), all_dir.path(), FakeServer::default())
        .ensure(ResolutionSelector::parse("all")?.resolutions())?;
    let list = VideoFetcher::new(&default_endpoint(), list_dir.path(), FakeServer::default())
        .ensure(ResolutionSelector::parse("vga,720p,1080p,4k")?.resolutions())?;

    assert_eq!(names(&all), names(&list));
    assert_eq!(names(&all), ["vga.webm", "720p.mp4", "1080p.mp4", "4k.mp4"]);
    Ok(())
}

#[test]
fn second_run_is_served_from_disk() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let resolutions = ResolutionSelector::parse("vga,4k")?;

    let first = VideoFetcher::new(&default_endpoint(), dir.path(), FakeServer::default());
    first.ensure(resolutions.resolutions())?;
    assert_eq!(
        *first.transport().served.lock(),
        ["/bench/vga.webm", "/bench/4k.mp4"]
    );

    let second = VideoFetcher::new(&default_endpoint(), dir.path(), FakeServer::default());
    let videos = second.ensure(resolutions.resolutions())?;
    assert!(second.transport().served.lock().is_empty());
    assert_eq!(videos.len(), 2);
    assert_eq!(
        fs::read_to_string(&videos[0].path)?,
        "http://download.openalpr.com/bench/vga.webm"
    );
    Ok(())
}

#[test]
fn partially_cached_directory_downloads_the_rest() -> Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("1080p.mp4"), b"cached")?;
    let fetcher = VideoFetcher::new(&default_endpoint(), dir.path(), FakeServer::default());

    let videos = fetcher.ensure(ResolutionSelector::parse("1080p,720p")?.resolutions())?;

    assert_eq!(*fetcher.transport().served.lock(), ["/bench/720p.mp4"]);
    assert_eq!(videos[0].path, dir.path().join("1080p.mp4"));
    assert_eq!(videos[1].path, dir.path().join("720p.mp4"));
    Ok(())
}
