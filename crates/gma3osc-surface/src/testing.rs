//! Recording fakes shared by the unit tests of this crate.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::rc::Rc;

use bytes::Bytes;
use gma3osc_frame::{parse_message, Dispatcher, ParsedMessage};
use gma3osc_transport::DatagramSocket;

use crate::input::ManualClock;
use crate::registry::Registry;
use crate::surface::Surface;

#[derive(Default)]
struct Link {
    sent: Vec<Bytes>,
    inbound: VecDeque<Bytes>,
}

/// Datagram socket that records every outbound packet and replays queued inbound ones.
#[derive(Clone, Default)]
pub(crate) struct RecordingLink(Rc<RefCell<Link>>);

impl RecordingLink {
    pub(crate) fn dispatcher(&self) -> Dispatcher {
        Dispatcher::datagram(self.clone(), SocketAddr::from((Ipv4Addr::LOCALHOST, 8000)))
    }

    pub(crate) fn sent(&self) -> Vec<Bytes> {
        self.0.borrow().sent.clone()
    }

    /// Outbound packets decoded without prefix filtering.
    pub(crate) fn parsed(&self) -> Vec<ParsedMessage> {
        self.sent()
            .iter()
            .filter_map(|packet| parse_message(packet, ""))
            .collect()
    }

    pub(crate) fn clear(&self) {
        self.0.borrow_mut().sent.clear();
    }

    pub(crate) fn push_inbound(&self, packet: &[u8]) {
        self.0
            .borrow_mut()
            .inbound
            .push_back(Bytes::copy_from_slice(packet));
    }
}

impl DatagramSocket for RecordingLink {
    fn send_to(&mut self, payload: &[u8], _remote: SocketAddr) -> io::Result<usize> {
        self.0.borrow_mut().sent.push(Bytes::copy_from_slice(payload));
        Ok(payload.len())
    }

    fn recv_packet(&mut self) -> io::Result<Option<(Bytes, SocketAddr)>> {
        let from = SocketAddr::from((Ipv4Addr::LOCALHOST, 8000));
        Ok(self.0.borrow_mut().inbound.pop_front().map(|packet| (packet, from)))
    }
}

/// Surface with default naming whose console link records traffic.
pub(crate) fn recording_surface() -> (Surface, RecordingLink) {
    let (surface, link, _) = clocked_surface();
    (surface, link)
}

/// Like [`recording_surface`], plus a manual clock starting at 0 ms.
pub(crate) fn clocked_surface() -> (Surface, RecordingLink, ManualClock) {
    let link = RecordingLink::default();
    let clock = ManualClock::new(0);
    let surface = Surface::new(Registry::new(), link.dispatcher()).with_clock(clock.clone());
    (surface, link, clock)
}
