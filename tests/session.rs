//! Whole-file round trips through the capture session, over real files.

use capsnap::record::{LlSidecar, PlainRecord, RecordHeader, SIDECAR_LEN};
use capsnap::ring::{SockAddrLl, TPacket2Hdr};
use capsnap::{Dialect, Endianness, Format, Kind, LinkType, Mode, Packet, Session};
use std::io::Write;

fn write_file(
    path: &str,
    kind: Kind,
    format: Format,
    link_type: LinkType,
    packets: &[(RecordHeader, Vec<u8>)],
) {
    let mut session = Session::new(kind);
    session.set_link_type(link_type);
    session.set_format(format);
    session.open(path, Mode::Write).unwrap();
    session.write_file_header().unwrap();
    for (header, payload) in packets {
        let mut pkt = Packet::with_capacity(payload.len().max(1));
        pkt.header = *header;
        pkt.buf_mut()[..payload.len()].copy_from_slice(payload);
        session.write_packet(&pkt).unwrap();
    }
    session.close().unwrap();
}

fn read_all(path: &str, kind: Kind, buf_size: usize) -> (Session, Vec<(RecordHeader, Vec<u8>, u32)>) {
    let mut session = Session::new(kind);
    session.open(path, Mode::Read).unwrap();
    session.read_file_header().unwrap();
    let mut out = Vec::new();
    let mut pkt = Packet::with_capacity(buf_size);
    while let Some(wire_len) = session.read_packet(&mut pkt).unwrap() {
        out.push((pkt.header, pkt.payload().to_vec(), wire_len));
    }
    (session, out)
}

fn plain_header(dialect: Dialect, caplen: u32, len: u32) -> RecordHeader {
    let rec = PlainRecord {
        ts_sec: 1_700_000_000,
        ts_frac: 123_456,
        caplen,
        len,
    };
    match dialect {
        Dialect::Default => RecordHeader::Default(rec),
        Dialect::Nsec => RecordHeader::Nsec(rec),
        _ => unreachable!(),
    }
}

#[test]
fn empty_file_after_valid_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.pcap");
    let path = path.to_str().unwrap();

    write_file(path, Kind::Plain, Format::default(), LinkType::EN10MB, &[]);

    let (session, packets) = read_all(path, Kind::Plain, 2048);
    assert!(packets.is_empty());
    assert_eq!(session.truncated(), 0);
    assert_eq!(session.link_type(), LinkType::EN10MB);
}

#[test]
fn one_packet_nsec_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("one.pcap");
    let path = path.to_str().unwrap();

    let frame: Vec<u8> = (0..60u8).collect();
    let header = RecordHeader::Nsec(PlainRecord {
        ts_sec: 1_700_000_000,
        ts_frac: 123_456_789,
        caplen: 60,
        len: 60,
    });
    write_file(
        path,
        Kind::Plain,
        Format::new(Dialect::Nsec, Endianness::native()),
        LinkType::EN10MB,
        &[(header, frame.clone())],
    );

    let (_, packets) = read_all(path, Kind::Plain, 2048);
    assert_eq!(packets.len(), 1);
    let (header, payload, wire_len) = &packets[0];
    assert_eq!(header.ts(), (1_700_000_000, 123_456_789));
    assert_eq!(header.payload_len(), 60);
    assert_eq!(*wire_len, 60);
    assert_eq!(*payload, frame);
}

#[test]
fn swapped_file_reads_like_a_native_one() {
    let dir = tempfile::tempdir().unwrap();
    let native_path = dir.path().join("native.pcap");
    let swapped_path = dir.path().join("swapped.pcap");

    let frame: Vec<u8> = (0..64u8).collect();
    let header = plain_header(Dialect::Default, 64, 64);
    for (path, endianness) in [
        (&native_path, Endianness::native()),
        (&swapped_path, Endianness::native().swapped()),
    ] {
        write_file(
            path.to_str().unwrap(),
            Kind::Plain,
            Format::new(Dialect::Default, endianness),
            LinkType::EN10MB,
            &[(header, frame.clone())],
        );
    }

    // The two files differ on disk but decode identically.
    let native_bytes = std::fs::read(&native_path).unwrap();
    let swapped_bytes = std::fs::read(&swapped_path).unwrap();
    assert_ne!(native_bytes[..24], swapped_bytes[..24]);

    let (_, native) = read_all(native_path.to_str().unwrap(), Kind::Plain, 2048);
    let (_, swapped) = read_all(swapped_path.to_str().unwrap(), Kind::Plain, 2048);
    assert_eq!(native[0].1, swapped[0].1);
    assert_eq!(native[0].0.payload_len(), 64);
    assert_eq!(swapped[0].0.payload_len(), 64);
    assert_eq!(swapped[0].0.ts(), native[0].0.ts());
}

#[test]
fn handcrafted_big_endian_file_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("be.pcap");

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0xa1b2_c3d4u32.to_be_bytes());
    bytes.extend_from_slice(&2u16.to_be_bytes());
    bytes.extend_from_slice(&4u16.to_be_bytes());
    bytes.extend_from_slice(&0i32.to_be_bytes());
    bytes.extend_from_slice(&0u32.to_be_bytes());
    bytes.extend_from_slice(&65535u32.to_be_bytes());
    bytes.extend_from_slice(&1u32.to_be_bytes()); // EN10MB
    bytes.extend_from_slice(&100u32.to_be_bytes()); // ts_sec
    bytes.extend_from_slice(&7u32.to_be_bytes()); // ts_usec
    bytes.extend_from_slice(&64u32.to_be_bytes()); // caplen
    bytes.extend_from_slice(&64u32.to_be_bytes()); // len
    bytes.extend_from_slice(&[0xabu8; 64]);
    std::fs::File::create(&path)
        .unwrap()
        .write_all(&bytes)
        .unwrap();

    let (session, packets) = read_all(path.to_str().unwrap(), Kind::Plain, 2048);
    assert_eq!(session.format().endianness, Endianness::Big);
    assert_eq!(session.format().dialect, Dialect::Default);
    assert_eq!(packets.len(), 1);
    assert_eq!(packets[0].0.payload_len(), 64);
    assert_eq!(packets[0].0.ts(), (100, 7000));
}

#[test]
fn sll_files_promote_read_dissector_lengths_and_demote_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sll.pcap");
    let path = path.to_str().unwrap();

    // A 32-byte cooked frame captured off the ring.
    let thdr = TPacket2Hdr {
        sec: 1_700_000_000,
        nsec: 5_000,
        snaplen: 32,
        len: 32,
        status: 0,
    };
    let sll = SockAddrLl {
        ifindex: 2,
        protocol: 0x0800,
        hatype: 1,
        pkttype: 0,
        halen: 6,
        addr: [1, 2, 3, 4, 5, 6, 0, 0],
    };
    let format = Format::default().promote_for(LinkType::LINUX_SLL);
    assert_eq!(format.dialect, Dialect::DefaultLl);
    let header = RecordHeader::from_tpacket2(&thdr, &sll, format.dialect);
    assert_eq!(header.on_disk_caplen(), 32 + SIDECAR_LEN as u32);

    let frame: Vec<u8> = (0..32u8).collect();
    write_file(
        path,
        Kind::Plain,
        Format::default(),
        LinkType::LINUX_SLL,
        &[(header, frame.clone())],
    );

    // On disk: the public DEFAULT magic, and the record's caplen includes
    // the 16-byte sidecar.
    let raw = std::fs::read(path).unwrap();
    let magic = u32::from_ne_bytes(raw[0..4].try_into().unwrap());
    assert!(magic == 0xa1b2_c3d4 || magic == 0xa1b2_c3d4u32.swap_bytes());
    assert_eq!(raw.len(), 24 + 32 + 32);

    let (session, packets) = read_all(path, Kind::Plain, 2048);
    assert_eq!(session.format().dialect, Dialect::DefaultLl);
    let (header, payload, wire_len) = &packets[0];
    assert_eq!(header.payload_len(), 32);
    assert_eq!(*wire_len, 32);
    assert_eq!(*payload, frame);

    // The sidecar fields survived the trip.
    let sidecar = header.sidecar().unwrap();
    assert_eq!(*sidecar, LlSidecar::from_sockaddr(&sll));
    let mut back = TPacket2Hdr::default();
    let mut back_sll = SockAddrLl::default();
    header.to_tpacket2(&mut back, Some(&mut back_sll));
    assert_eq!(back_sll, sll);
    assert_eq!(back.snaplen, 32);
}

#[test]
fn zero_length_and_oversize_records_count_as_truncated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trunc.pcap");
    let path = path.to_str().unwrap();

    let zero = plain_header(Dialect::Default, 0, 0);
    let oversize = plain_header(Dialect::Default, 100, 100);
    let big_frame: Vec<u8> = (0..100u8).collect();
    write_file(
        path,
        Kind::Plain,
        Format::default(),
        LinkType::EN10MB,
        &[(zero, Vec::new()), (oversize, big_frame.clone())],
    );

    // Read with a 64-byte buffer: the zero-length record is skipped, the
    // oversize one is clipped; both count.
    let (session, packets) = read_all(path, Kind::Plain, 64);
    assert_eq!(session.truncated(), 2);
    assert_eq!(packets.len(), 1);
    let (header, payload, _) = &packets[0];
    assert_eq!(header.payload_len(), 64);
    assert_eq!(*payload, big_frame[..64]);
}

#[test]
fn filtered_records_are_dropped_silently() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("filter.pcap");
    let path = path.to_str().unwrap();

    let packets: Vec<(RecordHeader, Vec<u8>)> = (0..4u8)
        .map(|i| (plain_header(Dialect::Default, 8, 8), vec![i; 8]))
        .collect();
    write_file(path, Kind::Plain, Format::default(), LinkType::EN10MB, &packets);

    let mut session = Session::new(Kind::Plain);
    session.set_filter(Box::new(|payload| payload[0] % 2 == 0));
    session.open(path, Mode::Read).unwrap();
    session.read_file_header().unwrap();

    let mut pkt = Packet::with_capacity(64);
    let mut seen = Vec::new();
    while session.read_packet(&mut pkt).unwrap().is_some() {
        seen.push(pkt.payload()[0]);
    }
    assert_eq!(seen, vec![0, 2]);
    assert_eq!(session.truncated(), 0);
}

#[test]
fn every_strategy_round_trips_the_same_file() {
    let frame: Vec<u8> = (0..120u8).collect();
    let header = plain_header(Dialect::Nsec, 120, 150);

    for write_kind in [Kind::Plain, Kind::ScatterGather, Kind::Mmap] {
        for read_kind in [Kind::Plain, Kind::ScatterGather, Kind::Mmap] {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("x.pcap");
            let path = path.to_str().unwrap();

            write_file(
                path,
                write_kind,
                Format::new(Dialect::Nsec, Endianness::native()),
                LinkType::EN10MB,
                &[(header, frame.clone()), (header, frame.clone())],
            );
            let (_, packets) = read_all(path, read_kind, 2048);
            assert_eq!(packets.len(), 2, "{write_kind:?} -> {read_kind:?}");
            for (hdr, payload, wire_len) in packets {
                assert_eq!(payload, frame, "{write_kind:?} -> {read_kind:?}");
                assert_eq!(hdr.payload_len(), 120);
                assert_eq!(wire_len, 150);
            }
        }
    }
}

#[test]
fn kuznetzov_and_borkmann_files_round_trip() {
    use capsnap::record::{BorkmannRecord, KuznetzovRecord};

    let dir = tempfile::tempdir().unwrap();
    for (name, format, header) in [
        (
            "kuz.pcap",
            Format::new(Dialect::Kuznetzov, Endianness::native()),
            RecordHeader::Kuznetzov(KuznetzovRecord {
                ts_sec: 1,
                ts_usec: 2,
                caplen: 40,
                len: 40,
                ifindex: 9,
                protocol: 0x0800,
                pkttype: 4,
            }),
        ),
        (
            "bkm.pcap",
            Format::new(Dialect::Borkmann, Endianness::native().swapped()),
            RecordHeader::Borkmann(BorkmannRecord {
                ts_sec: 1,
                ts_nsec: 2,
                caplen: 40,
                len: 40,
                tsource: 3,
                ifindex: 9,
                protocol: 0x0800,
                hatype: 1,
                pkttype: 4,
            }),
        ),
    ] {
        let path = dir.path().join(name);
        let path = path.to_str().unwrap();
        let frame: Vec<u8> = (0..40u8).collect();
        write_file(path, Kind::Plain, format, LinkType::EN10MB, &[(header, frame.clone())]);
        let (session, packets) = read_all(path, Kind::Plain, 2048);
        assert_eq!(session.format(), format);
        assert_eq!(packets.len(), 1, "{name}");
        assert_eq!(packets[0].0, header, "{name}");
        assert_eq!(packets[0].1, frame, "{name}");
    }
}

#[test]
fn bad_files_are_rejected_at_open() {
    let dir = tempfile::tempdir().unwrap();

    // Wrong magic.
    let path = dir.path().join("badmagic.pcap");
    std::fs::write(&path, [0u8; 24]).unwrap();
    let mut session = Session::new(Kind::Plain);
    session.open(path.to_str().unwrap(), Mode::Read).unwrap();
    assert!(matches!(
        session.read_file_header(),
        Err(capsnap::Error::UnsupportedMagic(_))
    ));

    // Truncated header.
    let path = dir.path().join("short.pcap");
    std::fs::write(&path, &0xa1b2_c3d4u32.to_ne_bytes()).unwrap();
    let mut session = Session::new(Kind::Plain);
    session.open(path.to_str().unwrap(), Mode::Read).unwrap();
    assert!(matches!(
        session.read_file_header(),
        Err(capsnap::Error::TruncatedFileHeader)
    ));

    // Unsupported link type.
    let mut header = Vec::new();
    header.extend_from_slice(&0xa1b2_c3d4u32.to_ne_bytes());
    header.extend_from_slice(&2u16.to_ne_bytes());
    header.extend_from_slice(&4u16.to_ne_bytes());
    header.extend_from_slice(&[0u8; 12]);
    header.extend_from_slice(&0x9999u32.to_ne_bytes());
    let path = dir.path().join("badlink.pcap");
    std::fs::write(&path, &header).unwrap();
    let mut session = Session::new(Kind::Plain);
    session.open(path.to_str().unwrap(), Mode::Read).unwrap();
    assert!(matches!(
        session.read_file_header(),
        Err(capsnap::Error::UnsupportedLinkType(0x9999))
    ));
}

#[test]
fn mid_record_truncation_is_end_of_stream() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cut.pcap");
    let path = path.to_str().unwrap();

    let frame: Vec<u8> = (0..64u8).collect();
    write_file(
        path,
        Kind::Plain,
        Format::default(),
        LinkType::EN10MB,
        &[(plain_header(Dialect::Default, 64, 64), frame)],
    );
    // Chop the file in the middle of the record payload.
    let bytes = std::fs::read(path).unwrap();
    std::fs::write(path, &bytes[..24 + 16 + 10]).unwrap();

    let (_, packets) = read_all(path, Kind::Plain, 2048);
    assert!(packets.is_empty());
}
