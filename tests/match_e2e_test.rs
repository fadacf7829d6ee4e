//! Full host/joiner match over loopback through the sync facade

use std::net::Ipv4Addr;
use std::thread::sleep;
use std::time::{Duration, Instant};

use net_tetris::multiplayer::MultiplayerMatch;
use net_tetris::net::{join_code, MalformedCodeError, NetConfig};
use net_tetris::types::GameAction;

fn loopback_config() -> NetConfig {
    NetConfig {
        bind_host: "127.0.0.1".to_string(),
        ..NetConfig::default()
    }
}

fn wait_for(what: &str, mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return;
        }
        sleep(Duration::from_millis(10));
    }
    panic!("timed out waiting for: {}", what);
}

#[test]
fn host_and_joiner_play_a_match() {
    let mut host = MultiplayerMatch::host(11, loopback_config()).unwrap();
    assert!(host.net().is_host());
    assert_eq!(host.net().join_code().len(), 8);

    let code = host.net().loopback_code().to_string();
    let mut joiner = MultiplayerMatch::join(22, &code, loopback_config()).unwrap();
    assert!(!joiner.net().is_host());

    // The joiner appears in the host's opponent list before the match starts
    wait_for("joiner visible to host", || {
        host.poll();
        host.opponents().iter().any(|o| o.peer == 1 && o.connected)
    });

    // Inputs before the start signal do nothing
    assert!(!joiner.input(GameAction::MoveLeft));

    // Only the host can start; the signal reaches the joiner
    assert!(!joiner.start());
    assert!(host.start());
    assert!(host.engine().started());
    wait_for("start signal at joiner", || {
        joiner.poll();
        joiner.match_started()
    });
    assert!(joiner.engine().started());

    // A host hard drop shows up in the joiner's view of peer 0
    assert!(host.input(GameAction::HardDrop));
    wait_for("host board at joiner", || {
        joiner.poll();
        joiner
            .opponents()
            .iter()
            .any(|o| o.peer == 0 && o.cells.iter().any(|&c| c != 0))
    });

    // And a joiner hard drop shows up on the host's side
    assert!(joiner.input(GameAction::HardDrop));
    wait_for("joiner board at host", || {
        host.poll();
        host.opponents()
            .iter()
            .any(|o| o.peer == 1 && o.cells.iter().any(|&c| c != 0))
    });

    // Stack the joiner out; its defeat reaches the host, whose own
    // session keeps running
    for _ in 0..300 {
        if joiner.engine().game_over() {
            break;
        }
        joiner.input(GameAction::HardDrop);
    }
    assert!(joiner.engine().game_over());

    wait_for("joiner defeat at host", || {
        host.poll();
        host.opponents().iter().any(|o| o.peer == 1 && o.defeated)
    });
    assert!(!host.engine().game_over());
}

#[test]
fn joiner_disconnect_leaves_the_host_running() {
    let mut host = MultiplayerMatch::host(5, loopback_config()).unwrap();
    let code = host.net().loopback_code().to_string();

    let joiner = MultiplayerMatch::join(6, &code, loopback_config()).unwrap();
    wait_for("joiner visible to host", || {
        host.poll();
        host.opponents().iter().any(|o| o.peer == 1 && o.connected)
    });

    drop(joiner);
    wait_for("disconnect visible to host", || {
        host.poll();
        host.opponents().iter().any(|o| o.peer == 1 && !o.connected)
    });

    assert!(host.start());
    assert!(!host.engine().game_over());
}

#[test]
fn malformed_join_code_is_rejected() {
    let err = MultiplayerMatch::join(1, "not a code!", NetConfig::default()).unwrap_err();
    assert!(err.downcast_ref::<MalformedCodeError>().is_some());
}

#[test]
fn unreachable_host_is_a_connect_error() {
    // A valid code pointing at a loopback port nobody listens on
    let code = join_code::encode(Ipv4Addr::LOCALHOST, 1);
    assert!(MultiplayerMatch::join(1, &code, NetConfig::default()).is_err());
}
