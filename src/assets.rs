use cfg_if::cfg_if;

#[allow(unused_imports)]
use log::debug;

// Relative urls resolve against the page that loaded the wasm
#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let href = window
        .location()
        .href()
        .map_err(|e| anyhow::anyhow!("reading page location: {e:?}"))?;
    let base = reqwest::Url::parse(&href)?;
    Ok(base.join(file_name)?)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            let url = format_url(file_name)?;
            debug!("fetching {url}");
            let data = reqwest::get(url)
                .await?
                .error_for_status()?
                .bytes()
                .await?
                .to_vec();
        } else {
            debug!("reading {file_name}");
            let data = std::fs::read(file_name)
                .map_err(|e| anyhow::anyhow!("reading {file_name}: {e}"))?;
        }
    }

    Ok(data)
}

/// Fetch every url, in order. Stops at the first failure.
pub async fn load_binaries(urls: &[String]) -> anyhow::Result<Vec<Vec<u8>>> {
    let mut data = Vec::with_capacity(urls.len());
    for url in urls {
        data.push(load_binary(url).await?);
    }
    Ok(data)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.bin");
        std::fs::write(&a, [1u8, 2]).unwrap();
        std::fs::write(&b, [3u8]).unwrap();
        let urls = vec![
            a.to_string_lossy().into_owned(),
            b.to_string_lossy().into_owned(),
        ];
        let data = pollster::block_on(load_binaries(&urls)).unwrap();
        assert_eq!(data, vec![vec![1, 2], vec![3]]);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = pollster::block_on(load_binary("no/such/posx.jpg")).unwrap_err();
        assert!(err.to_string().contains("no/such/posx.jpg"));
    }
}
