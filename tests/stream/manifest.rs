use streamgate_upstream::manifest::{is_playlist, proxy_url, referer_for};
use streamgate_upstream::{rewrite_manifest, ManifestPolicy};

const BASE: &str = "https://cdn.example/hls/720/index.m3u8";

#[test]
fn rewrites_variant_playlist() {
    let manifest = "#EXTM3U\n\
#EXT-X-VERSION:3\n\
#EXT-X-KEY:METHOD=AES-128,URI=\"key.bin\"\n\
#EXTINF:10.0,\n\
seg-0.ts\n\
\n\
#EXTINF:10.0,\n\
https://other.example/seg-1.ts\n\
#EXT-X-ENDLIST";

    let out = rewrite_manifest(manifest, BASE, &ManifestPolicy::default());
    let lines: Vec<&str> = out.split('\n').collect();

    assert_eq!(lines[0], "#EXTM3U");
    assert_eq!(lines[1], "#EXT-X-VERSION:3");
    assert_eq!(
        lines[2],
        format!(
            "#EXT-X-KEY:METHOD=AES-128,URI=\"{}\"",
            proxy_url("https://cdn.example/hls/720/key.bin")
        )
    );
    assert_eq!(lines[4], proxy_url("https://cdn.example/hls/720/seg-0.ts"));
    assert_eq!(lines[5], "");
    assert_eq!(lines[7], "https://other.example/seg-1.ts");
    assert_eq!(lines[8], "#EXT-X-ENDLIST");
}

#[test]
fn absolute_references_follow_policy() {
    let manifest = "#EXTM3U\nhttps://other.example/seg-1.ts";
    let out = rewrite_manifest(manifest, BASE, &ManifestPolicy::proxy_absolute(true));
    assert_eq!(
        out,
        format!("#EXTM3U\n{}", proxy_url("https://other.example/seg-1.ts"))
    );
}

#[test]
fn rewriting_twice_changes_nothing() {
    let manifest = "#EXTM3U\n../480/index.m3u8\nseg.ts\r\n";
    let policy = ManifestPolicy::proxy_absolute(true);
    let once = rewrite_manifest(manifest, BASE, &policy);
    let twice = rewrite_manifest(&once, BASE, &policy);
    assert_eq!(once, twice);
    assert!(once.contains(&proxy_url("https://cdn.example/hls/480/index.m3u8")));
    assert!(once.ends_with("\r\n"));
}

#[test]
fn playlist_detection_and_referer() {
    assert!(is_playlist(BASE, None));
    assert!(is_playlist("https://cdn.example/master?token=1", Some("application/vnd.apple.mpegurl")));
    assert!(!is_playlist("https://cdn.example/seg.ts", Some("video/mp2t")));
    assert_eq!(referer_for(BASE), "https://cdn.example/");
    assert_eq!(referer_for("not a url"), "https://hianime.to/");
}
