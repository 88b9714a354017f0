#![cfg(feature = "cli")]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::process::Command;
use std::thread::JoinHandle;

const HEADER_SIZE: usize = 12;
const MAGIC: [u8; 4] = [0xCC, 0xBB, 0xAA, 0xFF];

fn orbisdbg() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_orbisdbg"));
    cmd.arg("--log-level").arg("error");
    cmd
}

/// Bind a loopback listener and run one scripted exchange on a thread.
fn fake_console<F>(script: F) -> (u16, JoinHandle<()>)
where
    F: FnOnce(std::net::TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("loopback bind should succeed");
    let port = listener.local_addr().unwrap().port();
    let handle = std::thread::spawn(move || {
        let (peer, _addr) = listener.accept().expect("client should connect");
        script(peer);
    });
    (port, handle)
}

fn read_header(peer: &mut std::net::TcpStream) -> (u32, u32) {
    let mut head = [0u8; HEADER_SIZE];
    peer.read_exact(&mut head).expect("header should arrive");
    assert_eq!(&head[0..4], &MAGIC, "bad packet magic");
    let opcode = u32::from_le_bytes(head[4..8].try_into().unwrap());
    let declared = u32::from_le_bytes(head[8..12].try_into().unwrap());
    (opcode, declared)
}

#[test]
fn version_prints_package_version() {
    let output = orbisdbg().arg("version").output().expect("binary should run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn ps_decodes_fake_console_response_as_json() {
    let (port, console) = fake_console(|mut peer| {
        let (opcode, declared) = read_header(&mut peer);
        assert_eq!(opcode, 0xBDAA_0001);
        assert_eq!(declared, 0);

        peer.write_all(&[0, 0, 0, 0]).unwrap(); // status
        peer.write_all(&2u32.to_le_bytes()).unwrap();
        for (name, pid) in [("SceShellCore", 41i32), ("eboot.bin", 77i32)] {
            let mut entry = [0u8; 36];
            entry[..name.len()].copy_from_slice(name.as_bytes());
            entry[32..36].copy_from_slice(&pid.to_le_bytes());
            peer.write_all(&entry).unwrap();
        }
    });

    let output = orbisdbg()
        .arg("--format")
        .arg("json")
        .arg("ps")
        .arg(format!("127.0.0.1:{port}"))
        .output()
        .expect("binary should run");
    console.join().expect("fake console should finish");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(parsed["count"], 2);
    assert_eq!(parsed["processes"][0]["name"], "SceShellCore");
    assert_eq!(parsed["processes"][0]["pid"], 41);
    assert_eq!(parsed["processes"][1]["name"], "eboot.bin");
}

#[test]
fn notify_sends_exact_wire_bytes() {
    let (port, console) = fake_console(|mut peer| {
        let (opcode, declared) = read_header(&mut peer);
        assert_eq!(opcode, 0xBDDD_0004);
        assert_eq!(declared, 8);

        let mut args = [0u8; 8];
        peer.read_exact(&mut args).unwrap();
        assert_eq!(u32::from_le_bytes(args[0..4].try_into().unwrap()), 222);
        let msg_len = u32::from_le_bytes(args[4..8].try_into().unwrap()) as usize;
        assert_eq!(msg_len, 6);

        let mut message = vec![0u8; msg_len];
        peer.read_exact(&mut message).unwrap();
        assert_eq!(&message, b"Hello\0");

        peer.write_all(&[0, 0, 0, 0]).unwrap();
    });

    let output = orbisdbg()
        .arg("notify")
        .arg(format!("127.0.0.1:{port}"))
        .arg("--message")
        .arg("Hello")
        .output()
        .expect("binary should run");
    console.join().expect("fake console should finish");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn maps_renders_hex_addresses() {
    let (port, console) = fake_console(|mut peer| {
        let (opcode, declared) = read_header(&mut peer);
        assert_eq!(opcode, 0xBDAA_0004);
        assert_eq!(declared, 4);

        let mut pid = [0u8; 4];
        peer.read_exact(&mut pid).unwrap();
        assert_eq!(i32::from_le_bytes(pid), 41);

        peer.write_all(&[0, 0, 0, 0]).unwrap();
        peer.write_all(&1u32.to_le_bytes()).unwrap();
        let mut entry = [0u8; 58];
        entry[..4].copy_from_slice(b"text");
        entry[32..40].copy_from_slice(&0x40_0000u64.to_le_bytes());
        entry[40..48].copy_from_slice(&0x60_0000u64.to_le_bytes());
        entry[48..56].copy_from_slice(&0u64.to_le_bytes());
        entry[56..58].copy_from_slice(&0x5u16.to_le_bytes());
        peer.write_all(&entry).unwrap();
    });

    let output = orbisdbg()
        .arg("--format")
        .arg("json")
        .arg("maps")
        .arg(format!("127.0.0.1:{port}"))
        .arg("--pid")
        .arg("41")
        .output()
        .expect("binary should run");
    console.join().expect("fake console should finish");

    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(parsed["maps"][0]["start"], "0x400000");
    assert_eq!(parsed["maps"][0]["prot"], "r-x");
}

#[test]
fn connection_refused_exits_nonzero() {
    // Bind then drop to get a port nothing is listening on.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let output = orbisdbg()
        .arg("ps")
        .arg(format!("127.0.0.1:{port}"))
        .output()
        .expect("binary should run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("connect failed"));
}

#[test]
fn bad_console_address_is_usage_error() {
    let output = orbisdbg()
        .arg("ps")
        .arg(":744")
        .output()
        .expect("binary should run");

    assert_eq!(output.status.code(), Some(64));
}
