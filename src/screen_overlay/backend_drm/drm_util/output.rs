use anyhow::Context;
use drm::control::{Device as ControlDevice, Mode, connector, crtc};

/// A connected connector, the CRTC that will drive it and its preferred mode.
#[derive(Debug, Clone)]
pub struct Output {
    pub connector: connector::Handle,
    pub name: String,
    pub crtc: crtc::Handle,
    pub possible_crtcs: Vec<crtc::Handle>,
    pub mode: Mode,
}

impl Output {
    pub fn size(&self) -> (u16, u16) {
        self.mode.size()
    }
}

/// Connected outputs in connector order. The position in this list is the
/// output index accepted on the command line.
///
/// Connectors without modes or without a usable CRTC are left out.
pub fn connected_outputs<T: ControlDevice>(card: &T) -> anyhow::Result<Vec<Output>> {
    let resources = card.resource_handles().context("get drm resources")?;
    let mut outputs = Vec::new();

    for &handle in resources.connectors() {
        let info = card
            .get_connector(handle, false)
            .with_context(|| format!("get connector {handle:?}"))?;
        if info.state() != connector::State::Connected {
            continue;
        }
        let Some(&mode) = info.modes().first() else {
            continue;
        };

        let mut possible_crtcs = Vec::new();
        for &encoder in info.encoders() {
            let encoder = card
                .get_encoder(encoder)
                .with_context(|| format!("get encoder {encoder:?}"))?;
            for crtc in resources.filter_crtcs(encoder.possible_crtcs()) {
                if !possible_crtcs.contains(&crtc) {
                    possible_crtcs.push(crtc);
                }
            }
        }

        // 优先沿用当前 encoder 已绑定的 CRTC
        let current = info
            .current_encoder()
            .and_then(|e| card.get_encoder(e).ok())
            .and_then(|e| e.crtc());
        let Some(crtc) = current.or_else(|| possible_crtcs.first().copied()) else {
            continue;
        };

        outputs.push(Output {
            connector: handle,
            name: format!("{:?}-{}", info.interface(), info.interface_id()),
            crtc,
            possible_crtcs,
            mode,
        });
    }
    Ok(outputs)
}
