use bytes::BytesMut;
use gma3osc_frame::{slip_encode, Message};
use gma3osc_surface::SurfaceConfig;

use crate::cmd::{full_address, EncodeArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: EncodeArgs, config: &SurfaceConfig, format: OutputFormat) -> CliResult<i32> {
    let address = full_address(&args.address, config);
    let wire = encode(&address, &args)?;
    print_frame(&address, &wire, args.slip, format);
    Ok(SUCCESS)
}

fn encode(address: &str, args: &EncodeArgs) -> CliResult<Vec<u8>> {
    let message = Message::new(address, args.value.argument())
        .map_err(|err| frame_error("encode failed", err))?;
    if !args.slip {
        return Ok(message.as_bytes().to_vec());
    }
    let mut framed = BytesMut::with_capacity(message.len() + 2);
    slip_encode(message.as_bytes(), &mut framed);
    Ok(framed.to_vec())
}
